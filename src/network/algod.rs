use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client as HttpClient;
use tracing::{debug, warn};

use super::models::{
    AlgodError, ErrorResponse, PendingTransactionInfo, PostTransactionsResponse, SuggestedParams,
};
use super::NetworkClient;

const TOKEN_HEADER: &str = "X-Algo-API-Token";

/// REST client for an Algorand node (`algod` v2 API)
pub struct AlgodClient {
    http_client: HttpClient,
    api_token: String,
    base_url: String,
}

impl AlgodClient {
    /// `server` is the scheme + host; `port` is appended when non-empty
    pub fn new(api_token: String, server: &str, port: &str) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_token,
            base_url: Self::build_base_url(server, port),
        }
    }

    fn build_base_url(server: &str, port: &str) -> String {
        let server = server.trim_end_matches('/');
        if port.is_empty() {
            server.to_string()
        } else {
            format!("{}:{}", server, port)
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn create_headers(&self) -> Result<HeaderMap, AlgodError> {
        let mut headers = HeaderMap::new();
        if !self.api_token.is_empty() {
            let token = HeaderValue::from_str(&self.api_token).map_err(|e| {
                AlgodError::RequestError(format!("Failed to create token header: {}", e))
            })?;
            headers.insert(TOKEN_HEADER, token);
        }
        Ok(headers)
    }

    /// Map a non-success response onto an error variant
    async fn handle_error_response(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> AlgodError {
        let status_code = status.as_u16();
        let body_text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body_text)
            .ok()
            .and_then(|err| err.message)
            .unwrap_or(body_text);

        match status_code {
            400 => AlgodError::BadRequest(message),
            401 | 403 => AlgodError::Unauthorized(message),
            404 => AlgodError::NotFound(message),
            500..=599 => {
                warn!("algod server error {}: {}", status_code, message);
                AlgodError::ServerError(status_code, message)
            }
            _ => AlgodError::HttpError(status_code, message),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, AlgodError> {
        let url = format!("{}{}", self.base_url, path);
        let headers = self.create_headers()?;

        let response = self
            .http_client
            .get(&url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| AlgodError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| {
                AlgodError::DeserializationError(format!("Failed to parse response: {}", e))
            })
    }
}

#[async_trait]
impl NetworkClient for AlgodClient {
    /// GET /v2/transactions/pending/{txid}
    async fn pending_transaction_information(
        &self,
        tx_id: &str,
    ) -> Result<PendingTransactionInfo, AlgodError> {
        debug!("Querying pending information for {}", tx_id);
        self.get_json(&format!("/v2/transactions/pending/{}?format=json", tx_id))
            .await
    }

    /// GET /v2/transactions/params
    async fn suggested_params(&self) -> Result<SuggestedParams, AlgodError> {
        self.get_json("/v2/transactions/params").await
    }

    /// POST /v2/transactions
    async fn send_raw_transaction(&self, signed_txn: Vec<u8>) -> Result<String, AlgodError> {
        let url = format!("{}/v2/transactions", self.base_url);
        let mut headers = self.create_headers()?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/x-binary"));

        let response = self
            .http_client
            .post(&url)
            .headers(headers)
            .body(signed_txn)
            .send()
            .await
            .map_err(|e| AlgodError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        let body = response
            .json::<PostTransactionsResponse>()
            .await
            .map_err(|e| {
                AlgodError::DeserializationError(format!("Failed to parse response: {}", e))
            })?;
        Ok(body.tx_id)
    }
}
