use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::{handlers, AppState};

fn cors_layer(allowed_origins: Option<&str>) -> CorsLayer {
    match allowed_origins {
        Some(origins) if !origins.trim().is_empty() => {
            let origin_list: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|origin| {
                    let origin = origin.trim();
                    match origin.parse() {
                        Ok(value) => Some(value),
                        Err(_) => {
                            warn!("Ignoring invalid CORS origin '{}'", origin);
                            None
                        }
                    }
                })
                .collect();
            info!("CORS configured for origins: {}", origins);
            CorsLayer::new()
                .allow_origin(origin_list)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        _ => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    }
}

pub fn create_router(state: AppState, allowed_origins: Option<&str>) -> Router {
    let algorand = Router::new()
        .route("/send", post(handlers::send_handler))
        .route("/transactions", get(handlers::list_transactions_handler))
        .route("/status/:txId", get(handlers::transaction_status_handler));

    Router::new()
        .route("/", get(handlers::root_handler))
        .nest("/api/algorand", algorand)
        .with_state(state)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(
    state: AppState,
    addr: &str,
    allowed_origins: Option<&str>,
) -> std::io::Result<()> {
    let app = create_router(state, allowed_origins);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server is running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server");
}
