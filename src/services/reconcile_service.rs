use std::time::Duration;
use tracing::{debug, info, warn};

use crate::db::TransactionStore;
use crate::error::{AppError, Result};
use crate::models::TransactionRecord;
use crate::network::{AlgodError, NetworkClient};

/// Bring one stored transaction up to date with the network.
///
/// Terminal records are returned as stored without asking the network. A
/// transaction the node has never seen stays pending and is not an error; any
/// other failure to ask the node is surfaced as `AppError::ExternalQuery`.
/// At most one write happens, on the pending -> confirmed transition.
pub async fn reconcile(
    store: &dyn TransactionStore,
    network: &dyn NetworkClient,
    tx_id: &str,
    query_timeout: Duration,
) -> Result<TransactionRecord> {
    let mut record = store
        .find_by_tx_id(tx_id)
        .await?
        .ok_or_else(|| AppError::NotFound(tx_id.to_string()))?;

    if record.status.is_terminal() {
        return Ok(record);
    }

    let lookup = tokio::time::timeout(
        query_timeout,
        network.pending_transaction_information(tx_id),
    )
    .await
    .unwrap_or_else(|_| Err(AlgodError::Timeout(query_timeout.as_millis())));

    let info = match lookup {
        Ok(info) => info,
        Err(AlgodError::NotFound(_)) => {
            debug!("{} not yet known to the network, still pending", tx_id);
            return Ok(record);
        }
        Err(e) => {
            warn!("Status query for {} failed: {}", tx_id, e);
            return Err(AppError::ExternalQuery(e.to_string()));
        }
    };

    let Some(round) = info.confirmation_round() else {
        if !info.pool_error.is_empty() {
            warn!("{} reported a pool error: {}", tx_id, info.pool_error);
        }
        return Ok(record);
    };

    if store.mark_confirmed(tx_id, round).await? {
        info!("Transaction {} confirmed in round {}", tx_id, round);
        record.confirm(round);
        Ok(record)
    } else {
        // Another request got there first
        debug!("{} was already confirmed by a concurrent request", tx_id);
        store
            .find_by_tx_id(tx_id)
            .await?
            .ok_or_else(|| AppError::NotFound(tx_id.to_string()))
    }
}
