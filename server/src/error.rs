//! Error types for web handlers.
//!
//! This module bridges the engine's typed errors and HTTP responses,
//! implementing Axum's `IntoResponse` trait.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use celustock_core::EngineError;
use celustock_runtime::StoreError;
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// Wraps engine errors and provides HTTP-friendly error responses. Every
/// response body identifies the failure with a stable machine-readable
/// code and a message naming the offending entity.
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
        }
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            message.into(),
            "VALIDATION_ERROR".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }

    /// Create a 503 Service Unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            message.into(),
            "SERVICE_UNAVAILABLE".to_string(),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

/// Maps each engine rejection onto the HTTP status the API contract
/// promises: validation → 400, unknown id → 404, everything that reflects
/// a state conflict → 409.
impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        let status = match &err {
            EngineError::Validation { .. } => StatusCode::BAD_REQUEST,
            EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
            EngineError::AlreadySold { .. }
            | EngineError::EmptyLedger
            | EngineError::EmptyQueue
            | EngineError::InconsistentState { .. } => StatusCode::CONFLICT,
        };
        Self::new(status, err.to_string(), err.code().to_string())
    }
}

impl From<StoreError<EngineError>> for AppError {
    fn from(err: StoreError<EngineError>) -> Self {
        match err {
            StoreError::Command(engine) => engine.into(),
            StoreError::ShuttingDown => Self::unavailable("store is shutting down"),
            StoreError::ShutdownTimeout(_) => Self::internal("store shutdown in progress"),
        }
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log internal errors
        if self.status.is_server_error() {
            tracing::error!(
                status = %self.status,
                code = %self.code,
                message = %self.message,
                "Internal server error"
            );
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use celustock_core::PhoneId;

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[VALIDATION_ERROR] Invalid input");
    }

    #[test]
    fn engine_errors_map_to_contract_status_codes() {
        let err: AppError = EngineError::NotFound {
            id: PhoneId::new(3),
        }
        .into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "phone 3 not found");

        let err: AppError = EngineError::AlreadySold {
            id: PhoneId::new(3),
        }
        .into();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, "INVALID_STATE");

        let err: AppError = EngineError::EmptyLedger.into();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let err: AppError = EngineError::blank_field("modelo").into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_shutdown_maps_to_unavailable() {
        let err: AppError = StoreError::<EngineError>::ShuttingDown.into();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
