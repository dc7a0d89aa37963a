use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::db::TransactionStore;
use crate::error::{AppError, Result};
use crate::models::TransactionRecord;

#[derive(Default, Debug)]
struct Data {
    records: Vec<TransactionRecord>,
    tx_index: HashMap<String, usize>,
    writes: usize,
}

/// Process-local record store, used when no database is configured
#[derive(Default, Clone, Debug)]
pub struct Memory {
    data: Arc<Mutex<Data>>,
}

impl Memory {
    /// Number of successful inserts and updates so far
    pub async fn write_count(&self) -> usize {
        self.data.lock().await.writes
    }
}

#[async_trait]
impl TransactionStore for Memory {
    async fn insert(&self, record: &TransactionRecord) -> Result<()> {
        let mut data = self.data.lock().await;
        if data.tx_index.contains_key(&record.tx_id) {
            return Err(AppError::Duplicate(record.tx_id.clone()));
        }
        let index = data.records.len();
        data.tx_index.insert(record.tx_id.clone(), index);
        data.records.push(record.clone());
        data.writes += 1;
        Ok(())
    }

    async fn find_by_tx_id(&self, tx_id: &str) -> Result<Option<TransactionRecord>> {
        let data = self.data.lock().await;
        Ok(data
            .tx_index
            .get(tx_id)
            .and_then(|index| data.records.get(*index))
            .cloned())
    }

    async fn list_newest_first(&self) -> Result<Vec<TransactionRecord>> {
        let data = self.data.lock().await;
        let mut records = data.records.clone();
        // Stable sort keeps insertion order for equal timestamps; reverse it
        records.reverse();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn mark_confirmed(&self, tx_id: &str, confirmed_round: u64) -> Result<bool> {
        let mut data = self.data.lock().await;
        let Some(index) = data.tx_index.get(tx_id).copied() else {
            return Ok(false);
        };
        let changed = data.records[index].confirm(confirmed_round);
        if changed {
            data.writes += 1;
        }
        Ok(changed)
    }
}
