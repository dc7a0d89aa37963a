//! Scripted network and signer used by tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::models::{AlgodError, PendingTransactionInfo, SuggestedParams};
use super::signer::{PaymentOrder, SignedPayment, SignerError, TransactionSigner};
use super::NetworkClient;

#[derive(Clone, Default)]
pub struct MockNetwork {
    pending_responses: Arc<Mutex<HashMap<String, Result<PendingTransactionInfo, AlgodError>>>>,
    broadcast_response: Arc<Mutex<Option<Result<String, AlgodError>>>>,
    broadcasts: Arc<Mutex<Vec<Vec<u8>>>>,
    delay: Arc<Mutex<Option<Duration>>>,
    queries: Arc<AtomicUsize>,
}

impl MockNetwork {
    pub fn set_confirmed(&self, tx_id: &str, round: u64) {
        self.set_response(
            tx_id,
            Ok(PendingTransactionInfo {
                confirmed_round: Some(round),
                pool_error: String::new(),
            }),
        );
    }

    pub fn set_in_pool(&self, tx_id: &str) {
        self.set_response(tx_id, Ok(PendingTransactionInfo::default()));
    }

    pub fn set_response(&self, tx_id: &str, response: Result<PendingTransactionInfo, AlgodError>) {
        self.pending_responses
            .lock()
            .unwrap()
            .insert(tx_id.to_string(), response);
    }

    pub fn set_broadcast_response(&self, response: Result<String, AlgodError>) {
        *self.broadcast_response.lock().unwrap() = Some(response);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn broadcasts(&self) -> Vec<Vec<u8>> {
        self.broadcasts.lock().unwrap().clone()
    }
}

#[async_trait]
impl NetworkClient for MockNetwork {
    async fn pending_transaction_information(
        &self,
        tx_id: &str,
    ) -> Result<PendingTransactionInfo, AlgodError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.pending_responses
            .lock()
            .unwrap()
            .get(tx_id)
            .cloned()
            .unwrap_or_else(|| Err(AlgodError::NotFound("txn does not exist".to_string())))
    }

    async fn suggested_params(&self) -> Result<SuggestedParams, AlgodError> {
        Ok(SuggestedParams {
            consensus_version: "future".to_string(),
            fee: 0,
            genesis_hash: "SGO1GKSzyE7IEPItTxCByw9x8FmnrCDexi9/cOUJOiI=".to_string(),
            genesis_id: "testnet-v1.0".to_string(),
            last_round: 1000,
            min_fee: 1000,
        })
    }

    async fn send_raw_transaction(&self, signed_txn: Vec<u8>) -> Result<String, AlgodError> {
        self.broadcasts.lock().unwrap().push(signed_txn);
        self.broadcast_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok("MOCKTXID".to_string()))
    }
}

#[derive(Clone, Default)]
pub struct MockSigner {
    calls: Arc<AtomicUsize>,
    fail_with: Arc<Mutex<Option<SignerError>>>,
}

impl MockSigner {
    pub const SENDER: &'static str = "SENDERSENDERSENDERSENDERSENDERSENDERSENDERSENDERSENDERSEND";

    pub fn fail_with(&self, error: SignerError) {
        *self.fail_with.lock().unwrap() = Some(error);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransactionSigner for MockSigner {
    async fn sign_payment(&self, order: &PaymentOrder) -> Result<SignedPayment, SignerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.fail_with.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(SignedPayment {
            from: Self::SENDER.to_string(),
            signed_txn: format!("{}:{}", order.to, order.amount).into_bytes(),
        })
    }
}
