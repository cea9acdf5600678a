use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::ledger::LedgerError;
use crate::models::OrderResponse;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Ledger(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

/// Every failure is rendered in the same `{ success, message }` shape the
/// order endpoint uses, so callers decode one type.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(OrderResponse::failed(self.to_string()))).into_response()
    }
}
