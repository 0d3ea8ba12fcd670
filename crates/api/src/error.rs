//! Mapping of domain errors to JSON responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use treasury_core::closing::ClosingError;
use treasury_core::ledger::MovementError;
use treasury_db::AccountError;
use treasury_shared::AppError;

/// Error response body `{ "error": code, "message": text }`.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status.
    pub status: StatusCode,
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl ApiError {
    /// Builds an error from a numeric status.
    #[must_use]
    pub fn new(status: u16, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = self.code, message = %self.message, "Request failed");
        }
        (
            self.status,
            Json(json!({
                "error": self.code,
                "message": self.message,
            })),
        )
            .into_response()
    }
}

impl From<ClosingError> for ApiError {
    fn from(e: ClosingError) -> Self {
        Self::new(e.http_status_code(), e.error_code(), e.to_string())
    }
}

impl From<MovementError> for ApiError {
    fn from(e: MovementError) -> Self {
        Self::new(e.http_status_code(), e.error_code(), e.to_string())
    }
}

impl From<AccountError> for ApiError {
    fn from(e: AccountError) -> Self {
        Self::new(e.http_status_code(), e.error_code(), e.to_string())
    }
}

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        Self::new(e.status_code(), e.error_code(), e.to_string())
    }
}
