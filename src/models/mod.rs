//! Data models shared by the server, the HTTP API and the polling client.

pub mod send;
pub mod transaction;

pub use send::SendRequest;
pub use transaction::{TransactionRecord, TransactionStatus};
