use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{SendRequest, TransactionRecord};

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Non-success response; carries the server's message when it sent one
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Failed to parse response: {0}")]
    Decode(String),
    #[error("Timed out after {0} ms")]
    Timeout(u128),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Server operations the poller depends on
#[async_trait]
pub trait StatusApi: Send + Sync {
    /// `GET /transactions`
    async fn fetch_all_transactions(&self) -> Result<Vec<TransactionRecord>, ClientError>;

    /// `GET /status/:txId`
    async fn check_transaction_status(&self, tx_id: &str) -> Result<TransactionRecord, ClientError>;
}

/// HTTP client for the `/api/algorand` surface
#[derive(Clone)]
pub struct ApiClient {
    http_client: HttpClient,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn error_message(status: u16, body_text: &str) -> String {
        serde_json::from_str::<ErrorBody>(body_text)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| format!("HTTP error! status: {}", status))
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ClientError::Http {
                status: status.as_u16(),
                message: Self::error_message(status.as_u16(), &body_text),
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// `POST /send`
    pub async fn send_transaction(
        &self,
        request: &SendRequest,
    ) -> Result<TransactionRecord, ClientError> {
        let response = self
            .http_client
            .post(format!("{}/send", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?;
        Self::handle_response(response).await
    }
}

#[async_trait]
impl StatusApi for ApiClient {
    async fn fetch_all_transactions(&self) -> Result<Vec<TransactionRecord>, ClientError> {
        let response = self
            .http_client
            .get(format!("{}/transactions", self.base_url))
            .send()
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?;
        Self::handle_response(response).await
    }

    async fn check_transaction_status(
        &self,
        tx_id: &str,
    ) -> Result<TransactionRecord, ClientError> {
        let response = self
            .http_client
            .get(format!("{}/status/{}", self.base_url, tx_id))
            .send()
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?;
        Self::handle_response(response).await
    }
}
