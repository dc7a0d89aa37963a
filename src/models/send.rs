use serde::{Deserialize, Serialize};

/// Body of `POST /send`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendRequest {
    pub mnemonic: String,
    pub recipient: String,
    /// microAlgos
    pub amount: u64,
    #[serde(default)]
    pub note: Option<String>,
}
