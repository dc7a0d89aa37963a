use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlPool;

use crate::db::TransactionStore;
use crate::error::{AppError, Result};
use crate::models::{TransactionRecord, TransactionStatus};

type TransactionRow = (
    String,
    String,
    String,
    String,
    u64,
    String,
    String,
    DateTime<Utc>,
    Option<u64>,
);

const SELECT_COLUMNS: &str =
    "SELECT id, tx_id, sender, receiver, amount, note, status, created_at, confirmed_round \
     FROM transactions";

fn row_to_record(row: TransactionRow) -> Result<TransactionRecord> {
    let (id, tx_id, from, to, amount, note, status, created_at, confirmed_round) = row;
    let status = TransactionStatus::parse(&status)
        .ok_or_else(|| AppError::Internal(format!("Unknown status '{}' for {}", status, tx_id)))?;
    Ok(TransactionRecord {
        id,
        tx_id,
        from,
        to,
        amount,
        note,
        status,
        created_at,
        confirmed_round,
    })
}

/// Create a new transaction record
pub async fn create_transaction(pool: &MySqlPool, record: &TransactionRecord) -> Result<()> {
    let result = sqlx::query(
        "INSERT INTO transactions \
         (id, tx_id, sender, receiver, amount, note, status, created_at, confirmed_round) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&record.id)
    .bind(&record.tx_id)
    .bind(&record.from)
    .bind(&record.to)
    .bind(record.amount)
    .bind(&record.note)
    .bind(record.status.as_str())
    .bind(record.created_at)
    .bind(record.confirmed_round)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(AppError::Duplicate(record.tx_id.clone()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Get a transaction by its network transaction id
pub async fn get_transaction_by_tx_id(
    pool: &MySqlPool,
    tx_id: &str,
) -> Result<Option<TransactionRecord>> {
    let row = sqlx::query_as::<_, TransactionRow>(&format!("{} WHERE tx_id = ?", SELECT_COLUMNS))
        .bind(tx_id)
        .fetch_optional(pool)
        .await?;

    row.map(row_to_record).transpose()
}

/// Get all transactions, newest first
pub async fn get_all_transactions(pool: &MySqlPool) -> Result<Vec<TransactionRecord>> {
    let rows = sqlx::query_as::<_, TransactionRow>(&format!(
        "{} ORDER BY created_at DESC",
        SELECT_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(row_to_record).collect()
}

/// Set status to confirmed, only if the row is still pending.
/// Returns whether a row was changed.
pub async fn mark_confirmed(pool: &MySqlPool, tx_id: &str, confirmed_round: u64) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE transactions SET status = 'confirmed', confirmed_round = ? \
         WHERE tx_id = ? AND status = 'pending'",
    )
    .bind(confirmed_round)
    .bind(tx_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// MySQL-backed record store
#[derive(Clone)]
pub struct MySqlTransactionStore {
    pool: MySqlPool,
}

impl MySqlTransactionStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionStore for MySqlTransactionStore {
    async fn insert(&self, record: &TransactionRecord) -> Result<()> {
        create_transaction(&self.pool, record).await
    }

    async fn find_by_tx_id(&self, tx_id: &str) -> Result<Option<TransactionRecord>> {
        get_transaction_by_tx_id(&self.pool, tx_id).await
    }

    async fn list_newest_first(&self) -> Result<Vec<TransactionRecord>> {
        get_all_transactions(&self.pool).await
    }

    async fn mark_confirmed(&self, tx_id: &str, confirmed_round: u64) -> Result<bool> {
        mark_confirmed(&self.pool, tx_id, confirmed_round).await
    }
}
