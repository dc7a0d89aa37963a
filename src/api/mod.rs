pub mod handlers;
pub mod server;

use std::sync::Arc;
use std::time::Duration;

use crate::db::TransactionStore;
use crate::network::{NetworkClient, TransactionSigner};

pub use server::{create_router, run_server};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TransactionStore>,
    pub network: Arc<dyn NetworkClient>,
    pub signer: Arc<dyn TransactionSigner>,
    /// Upper bound on a single status query against the network
    pub query_timeout: Duration,
}
