//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request - required purchase fields missing or invalid.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Webhook signature did not verify; nothing was mutated.
    #[error("invalid webhook signature")]
    InvalidSignature,

    /// The payment processor call failed.
    #[error("payment processor error: {0}")]
    Processor(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            Self::InvalidSignature => (
                StatusCode::BAD_REQUEST,
                "invalid_signature",
                self.to_string(),
            ),
            // The processor's message is passed through to the caller.
            Self::Processor(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "processor_error",
                msg.clone(),
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<coinflow_store::StoreError> for ApiError {
    fn from(err: coinflow_store::StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}
