use clap::{Args, Parser, Subcommand};
use std::process::exit;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use algo_sender::api::{run_server, AppState};
use algo_sender::client::render::render_view;
use algo_sender::client::{
    ApiClient, ConfirmationPoller, LogNotifier, NotificationKind, Notifier, StatusApi,
    TransactionView,
};
use algo_sender::config::{self, ClientConfig, ServerConfig};
use algo_sender::db::{self, Memory, MySqlTransactionStore, TransactionStore};
use algo_sender::models::SendRequest;
use algo_sender::network::{AlgodClient, RemoteSigner};
use algo_sender::utils::explorer_url;

#[derive(Parser)]
#[command(version, about = "Send and track transactions on the Algorand TestNet")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ClientArgs {
    /// Base URL of the API, e.g. http://localhost:5001/api/algorand
    #[arg(long)]
    backend_url: Option<String>,
    /// Seconds between polling cycles
    #[arg(long)]
    interval_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve,
    /// Show the transaction history and poll pending transactions until Ctrl+C
    Watch {
        #[command(flatten)]
        client: ClientArgs,
    },
    /// Submit a payment, then watch it confirm
    Send {
        /// Recipient address
        #[arg(long)]
        recipient: String,
        /// Amount in microAlgos
        #[arg(long)]
        amount: u64,
        #[arg(long, default_value = "")]
        note: String,
        /// Sender's 25-word mnemonic
        #[arg(long, env = "SENDER_MNEMONIC", hide_env_values = true)]
        mnemonic: String,
        #[command(flatten)]
        client: ClientArgs,
    },
}

#[tokio::main]
async fn main() {
    config::load_dotenv();

    let filter = match "algo_sender=debug".parse() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Serve => serve().await,
        Command::Watch { client } => match client_config(&client) {
            Ok(config) => watch(&ApiClient::new(&config.backend_url), &config).await,
            Err(e) => Err(e),
        },
        Command::Send {
            recipient,
            amount,
            note,
            mnemonic,
            client,
        } => {
            let request = SendRequest {
                mnemonic,
                recipient,
                amount,
                note: Some(note),
            };
            send(request, &client).await
        }
    };

    if let Err(e) = result {
        error!("{}", e);
        exit(1);
    }
}

fn client_config(args: &ClientArgs) -> Result<ClientConfig, String> {
    let mut config = ClientConfig::from_env().map_err(|e| e.to_string())?;
    if let Some(url) = &args.backend_url {
        config.backend_url = url.clone();
    }
    if let Some(secs) = args.interval_secs.filter(|secs| *secs > 0) {
        config.poll_interval = Duration::from_secs(secs);
    }
    Ok(config)
}

async fn serve() -> Result<(), String> {
    let config = ServerConfig::from_env().map_err(|e| e.to_string())?;

    let store: Arc<dyn TransactionStore> = match &config.database_url {
        Some(url) => {
            info!("Initializing database...");
            let pool = db::init_db(url)
                .await
                .map_err(|e| format!("Failed to initialize database: {}", e))?;
            info!("Database initialized successfully");
            Arc::new(MySqlTransactionStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, records are kept in memory only");
            Arc::new(Memory::default())
        }
    };

    let network = AlgodClient::new(
        config.algod_token.clone(),
        &config.algod_server,
        &config.algod_port,
    );
    info!("Using algod at {}", network.base_url());

    let state = AppState {
        store,
        network: Arc::new(network),
        signer: Arc::new(RemoteSigner::new(config.signer_url.clone())),
        query_timeout: config.algod_timeout,
    };

    run_server(state, &config.bind_address(), config.allowed_origins.as_deref())
        .await
        .map_err(|e| format!("Server error: {}", e))
}

async fn watch(api: &ApiClient, config: &ClientConfig) -> Result<(), String> {
    let notifier = Arc::new(LogNotifier);

    let view = match api.fetch_all_transactions().await {
        Ok(transactions) => TransactionView::new(transactions),
        Err(e) => {
            notifier.notify(NotificationKind::Error, &e.to_string());
            TransactionView::default()
        }
    };
    println!("{}", render_view(&view));

    let shutdown = CancellationToken::new();
    let shutdown_trigger = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            warn!("Failed to listen for Ctrl+C");
            return;
        }
        info!("Shutdown signal received!");
        shutdown_trigger.cancel();
    });

    let poller = ConfirmationPoller::new(
        Arc::new(api.clone()),
        notifier,
        config.poll_interval,
        config.status_check_timeout,
    );
    poller
        .run(view, |view: &TransactionView| println!("{}", render_view(view)), shutdown)
        .await;

    Ok(())
}

async fn send(request: SendRequest, args: &ClientArgs) -> Result<(), String> {
    let config = client_config(args)?;
    let api = ApiClient::new(&config.backend_url);

    let record = api
        .send_transaction(&request)
        .await
        .map_err(|e| e.to_string())?;
    LogNotifier.notify(
        NotificationKind::Info,
        &format!("Transaction submitted: {}...", record.short_tx_id()),
    );
    info!("Track it at {}", explorer_url(&record.tx_id));

    watch(&api, &config).await
}
