use async_trait::async_trait;
use sqlx::mysql::MySqlPool;
use tracing::info;

use crate::error::Result;
use crate::models::TransactionRecord;

pub mod memory;
pub mod transaction;

pub use memory::Memory;
pub use transaction::MySqlTransactionStore;

const CREATE_TABLES: &str = include_str!("../../migrations/create_tables.sql");

/// Persistence for transaction records.
///
/// `tx_id` is unique across records. `mark_confirmed` is the only mutation and
/// only applies to a pending record.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn insert(&self, record: &TransactionRecord) -> Result<()>;

    async fn find_by_tx_id(&self, tx_id: &str) -> Result<Option<TransactionRecord>>;

    async fn list_newest_first(&self) -> Result<Vec<TransactionRecord>>;

    /// Conditional pending -> confirmed write. Returns whether anything changed.
    async fn mark_confirmed(&self, tx_id: &str, confirmed_round: u64) -> Result<bool>;
}

/// Initialize the MySQL connection pool and create tables
pub async fn init_db(database_url: &str) -> std::result::Result<MySqlPool, sqlx::Error> {
    let pool = MySqlPool::connect(database_url).await?;

    create_tables(&pool).await?;

    Ok(pool)
}

/// Create all database tables
async fn create_tables(pool: &MySqlPool) -> std::result::Result<(), sqlx::Error> {
    for statement in CREATE_TABLES.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::raw_sql(trimmed).execute(pool).await?;
        }
    }
    info!("Database schema ready");

    Ok(())
}
