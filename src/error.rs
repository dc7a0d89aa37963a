use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::network::{AlgodError, SignerError};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Transaction not found in database: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    /// The network could not be asked. Callers may retry.
    #[error("Failed to check transaction status: {0}")]
    ExternalQuery(String),

    #[error("Failed to sign transaction: {0}")]
    Signer(#[from] SignerError),

    #[error("Failed to send transaction: {0}")]
    Broadcast(AlgodError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Duplicate transaction id: {0}")]
    Duplicate(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::ExternalQuery(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Signer(_) | AppError::Broadcast(_) => StatusCode::BAD_GATEWAY,
            AppError::Duplicate(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}
