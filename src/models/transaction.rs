//! Transaction models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a submitted payment.
///
/// Only `Pending -> Confirmed` is ever produced. `Failed` is part of the
/// wire contract but nothing assigns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Confirmed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Confirmed => "confirmed",
            TransactionStatus::Failed => "failed",
        }
    }

    /// Parse the database representation
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(TransactionStatus::Pending),
            "confirmed" => Some(TransactionStatus::Confirmed),
            "failed" => Some(TransactionStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted payment, as stored by the server and returned by every endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "txId")]
    pub tx_id: String,
    pub from: String,
    pub to: String,
    /// microAlgos
    pub amount: u64,
    #[serde(default)]
    pub note: String,
    pub status: TransactionStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "confirmedRound", default, skip_serializing_if = "Option::is_none")]
    pub confirmed_round: Option<u64>,
}

impl TransactionRecord {
    /// New record for a freshly broadcast transaction
    pub fn pending(tx_id: String, from: String, to: String, amount: u64, note: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tx_id,
            from,
            to,
            amount,
            note,
            status: TransactionStatus::Pending,
            created_at: Utc::now(),
            confirmed_round: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }

    /// Move to `confirmed` at `round`. Returns false (and leaves the record
    /// untouched) when the record is not pending.
    pub fn confirm(&mut self, round: u64) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.status = TransactionStatus::Confirmed;
        self.confirmed_round = Some(round);
        true
    }

    /// First eight characters of the network id, used in notifications
    pub fn short_tx_id(&self) -> &str {
        match self.tx_id.char_indices().nth(8) {
            Some((idx, _)) => &self.tx_id[..idx],
            None => &self.tx_id,
        }
    }
}
