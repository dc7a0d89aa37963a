use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use super::AppState;
use crate::error::AppError;
use crate::models::{SendRequest, TransactionRecord};
use crate::services::{reconcile_service, send_service};

pub async fn root_handler() -> Json<Value> {
    Json(json!({ "msg": "Algo-Sender API is running..." }))
}

pub async fn send_handler(
    State(state): State<AppState>,
    payload: Result<Json<SendRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TransactionRecord>), AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let record = send_service::send_transaction(
        state.store.as_ref(),
        state.network.as_ref(),
        state.signer.as_ref(),
        request,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn list_transactions_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<TransactionRecord>>, AppError> {
    let transactions = state.store.list_newest_first().await?;
    Ok(Json(transactions))
}

pub async fn transaction_status_handler(
    State(state): State<AppState>,
    Path(tx_id): Path<String>,
) -> Result<Json<TransactionRecord>, AppError> {
    let record = reconcile_service::reconcile(
        state.store.as_ref(),
        state.network.as_ref(),
        &tx_id,
        state.query_timeout,
    )
    .await?;
    Ok(Json(record))
}
