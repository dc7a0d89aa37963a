use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Response of `GET /v2/transactions/pending/{txid}`
///
/// Only the fields the reconciler looks at are decoded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PendingTransactionInfo {
    #[serde(rename = "confirmed-round", default, skip_serializing_if = "Option::is_none")]
    pub confirmed_round: Option<u64>,
    /// Non-empty when the node kicked the transaction out of its pool
    #[serde(rename = "pool-error", default)]
    pub pool_error: String,
}

impl PendingTransactionInfo {
    /// algod reports `confirmed-round: 0` for transactions still in the pool
    pub fn confirmation_round(&self) -> Option<u64> {
        self.confirmed_round.filter(|round| *round > 0)
    }
}

/// Response of `GET /v2/transactions/params`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SuggestedParams {
    pub consensus_version: String,
    pub fee: u64,
    pub genesis_hash: String,
    pub genesis_id: String,
    pub last_round: u64,
    pub min_fee: u64,
}

/// Response of `POST /v2/transactions`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostTransactionsResponse {
    #[serde(rename = "txId")]
    pub tx_id: String,
}

/// Error body returned by algod
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: Option<String>,
}

/// Error type for algod operations
#[derive(Debug, Clone, Error)]
pub enum AlgodError {
    /// 400 Bad Request
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// 401 Unauthorized
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// 404 Not Found. For the pending endpoint this means the node has not
    /// seen the transaction (yet).
    #[error("Not Found: {0}")]
    NotFound(String),
    /// 5xx Server Error
    #[error("Server Error ({0}): {1}")]
    ServerError(u16, String),
    /// Other HTTP errors
    #[error("HTTP Error ({0}): {1}")]
    HttpError(u16, String),
    /// Network/request error
    #[error("Request Error: {0}")]
    RequestError(String),
    /// Deserialization error
    #[error("Deserialization Error: {0}")]
    DeserializationError(String),
    #[error("Timed out after {0} ms")]
    Timeout(u128),
}
