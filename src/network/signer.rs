//! Transaction construction and signing.
//!
//! Key handling lives outside this process: the server hands the mnemonic and
//! payment fields to a signing service and gets back the signed msgpack bytes,
//! which it then broadcasts itself.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::SuggestedParams;

#[derive(Debug, Clone, Error)]
pub enum SignerError {
    #[error("Signer request failed: {0}")]
    Request(String),
    #[error("Signer rejected the payment ({0}): {1}")]
    Rejected(u16, String),
    #[error("Invalid signer response: {0}")]
    Decode(String),
}

/// Payment to be constructed and signed
#[derive(Debug, Clone, Serialize)]
pub struct PaymentOrder {
    pub mnemonic: String,
    pub to: String,
    pub amount: u64,
    pub note: String,
    pub params: SuggestedParams,
}

/// Signed payment ready for broadcast
#[derive(Debug, Clone, PartialEq)]
pub struct SignedPayment {
    /// Sender address derived from the mnemonic
    pub from: String,
    pub signed_txn: Vec<u8>,
}

#[async_trait]
pub trait TransactionSigner: Send + Sync {
    async fn sign_payment(&self, order: &PaymentOrder) -> Result<SignedPayment, SignerError>;
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    from: String,
    #[serde(rename = "signedTxn")]
    signed_txn: String,
}

#[derive(Debug, Deserialize)]
struct SignErrorResponse {
    message: Option<String>,
}

/// HTTP client for the signing service (`POST {base_url}/sign`)
pub struct RemoteSigner {
    http_client: HttpClient,
    base_url: String,
}

impl RemoteSigner {
    pub fn new(base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn decode_response(body: SignResponse) -> Result<SignedPayment, SignerError> {
        let signed_txn = BASE64
            .decode(body.signed_txn.as_bytes())
            .map_err(|e| SignerError::Decode(e.to_string()))?;
        if signed_txn.is_empty() {
            return Err(SignerError::Decode("empty signed transaction".to_string()));
        }
        Ok(SignedPayment {
            from: body.from,
            signed_txn,
        })
    }
}

#[async_trait]
impl TransactionSigner for RemoteSigner {
    async fn sign_payment(&self, order: &PaymentOrder) -> Result<SignedPayment, SignerError> {
        let url = format!("{}/sign", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(order)
            .send()
            .await
            .map_err(|e| SignerError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<SignErrorResponse>(&body_text)
                .ok()
                .and_then(|err| err.message)
                .unwrap_or(body_text);
            return Err(SignerError::Rejected(status.as_u16(), message));
        }

        let body = response
            .json::<SignResponse>()
            .await
            .map_err(|e| SignerError::Decode(e.to_string()))?;
        Self::decode_response(body)
    }
}
