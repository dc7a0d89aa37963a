//! Access to the Algorand network.

pub mod algod;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod signer;

use async_trait::async_trait;

pub use algod::AlgodClient;
pub use models::{AlgodError, PendingTransactionInfo, SuggestedParams};
pub use signer::{PaymentOrder, RemoteSigner, SignedPayment, SignerError, TransactionSigner};

/// Node operations used by the server.
///
/// `pending_transaction_information` must keep three outcomes apart:
/// `Ok(_)` (the node knows the transaction), `Err(AlgodError::NotFound)` (the
/// node has not seen it) and any other `Err` (the node could not be asked).
#[async_trait]
pub trait NetworkClient: Send + Sync {
    async fn pending_transaction_information(
        &self,
        tx_id: &str,
    ) -> Result<PendingTransactionInfo, AlgodError>;

    async fn suggested_params(&self) -> Result<SuggestedParams, AlgodError>;

    /// Broadcast signed bytes, returning the network transaction id
    async fn send_raw_transaction(&self, signed_txn: Vec<u8>) -> Result<String, AlgodError>;
}
