//! Error types shared across layers.
//!
//! - [`StoreError`] - failures reported by link stores
//! - [`AppError`] - HTTP-facing errors rendered as JSON bodies

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::messaging::{Failure, FailureCode, SendError};
use crate::utils::url_validator::UrlValidationError;

/// Failures reported by a [`crate::domain::repositories::LinkStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Another row already holds this url. Recovered by the dedup store.
    #[error("url already stored: {0}")]
    Conflict(String),
    /// Backend unreachable or no pooled connection became available.
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
}

impl StoreError {
    /// Returns true for failures that are safe to retry later.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Maps SQLx errors onto [`StoreError`] categories.
pub fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let Some(db) = err.as_database_error()
        && db.is_unique_violation()
    {
        return StoreError::Conflict(db.constraint().unwrap_or("unique").to_string());
    }

    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StoreError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StoreError::InvalidData(message),
        _ => StoreError::Query(message),
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug)]
pub enum AppError {
    Validation { message: String, details: Value },
    NotFound { message: String, details: Value },
    Unavailable { message: String, details: Value },
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::Unavailable {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    fn parts(self) -> (StatusCode, &'static str, String, Value) {
        match self {
            AppError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                details,
            ),
            AppError::NotFound { message, details } => {
                (StatusCode::NOT_FOUND, "not_found", message, details)
            }
            AppError::Unavailable { message, details } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "unavailable",
                message,
                details,
            ),
            AppError::Internal { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message,
                details,
            ),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_error_info(self) -> ErrorInfo {
        let (_, code, message, details) = self.parts();
        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Validation { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Unavailable { message, .. }
            | AppError::Internal { message, .. } => f.write_str(message),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<Failure> for AppError {
    fn from(failure: Failure) -> Self {
        let details = json!({ "failure_code": failure.code.as_u8() });
        match failure.code {
            FailureCode::ResourceUnavailable => AppError::unavailable(failure.message, details),
            FailureCode::InvalidRequest => AppError::bad_request(failure.message, details),
            FailureCode::Internal => AppError::internal(failure.message, details),
            FailureCode::NotFound => AppError::not_found(failure.message, details),
        }
    }
}

impl From<SendError> for AppError {
    fn from(err: SendError) -> Self {
        match err {
            SendError::Failed(failure) => failure.into(),
            SendError::Timeout(after) => AppError::unavailable(
                "Storage did not answer in time",
                json!({ "timeout_ms": after.as_millis() as u64 }),
            ),
            SendError::Closed => AppError::unavailable("Storage gateway is not running", json!({})),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(&errors).unwrap_or_else(|_| json!({}));
        AppError::bad_request("Validation failed", details)
    }
}

impl From<UrlValidationError> for AppError {
    fn from(err: UrlValidationError) -> Self {
        AppError::bad_request("Invalid URL format", json!({ "reason": err.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_failure_codes_map_to_status() {
        let cases = [
            (Failure::unavailable("down"), StatusCode::SERVICE_UNAVAILABLE),
            (Failure::invalid_request("bad"), StatusCode::BAD_REQUEST),
            (Failure::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
            (Failure::not_found("missing"), StatusCode::NOT_FOUND),
        ];

        for (failure, status) in cases {
            assert_eq!(AppError::from(failure).status(), status);
        }
    }

    #[test]
    fn test_send_errors_are_unavailable() {
        let timeout = AppError::from(SendError::Timeout(Duration::from_millis(10)));
        assert_eq!(timeout.status(), StatusCode::SERVICE_UNAVAILABLE);

        let closed = AppError::from(SendError::Closed);
        assert_eq!(closed.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_error_info_keeps_message() {
        let info = AppError::not_found("url not found", json!({ "id": 4 })).to_error_info();

        assert_eq!(info.code, "not_found");
        assert_eq!(info.message, "url not found");
        assert_eq!(info.details["id"], 4);
    }

    #[test]
    fn test_map_pool_timeout_is_unavailable() {
        let err = map_sqlx_error(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_map_row_not_found_is_invalid_data() {
        let err = map_sqlx_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::InvalidData(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_map_protocol_error_is_query() {
        let err = map_sqlx_error(sqlx::Error::Protocol("unexpected".into()));
        assert!(matches!(err, StoreError::Query(_)));
    }
}
