//! Error types for lumora-server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lumora_common::api::ErrorResponse;
use thiserror::Error;
use tracing::error;

use crate::services::LlmError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, invalid or expired session (401)
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated but not allowed (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409) - duplicate email, second review, ...
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Request understood but the target could not be processed (422)
    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    /// Language model call failed or returned garbage (502)
    #[error("AI error: {0}")]
    Ai(#[from] LlmError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// lumora-common error
    #[error("Common error: {0}")]
    Common(lumora_common::Error),
}

impl From<lumora_common::Error> for ApiError {
    fn from(err: lumora_common::Error) -> Self {
        use lumora_common::Error;
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Common(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Unauthorized".to_string(),
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Unprocessable(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE", msg)
            }
            ApiError::Ai(ref err) => {
                error!(error = %err, "AI request failed");
                (StatusCode::BAD_GATEWAY, "AI_ERROR", err.public_message())
            }
            ApiError::Internal(msg) => {
                error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
            }
            ApiError::Database(ref err) => {
                error!(error = %err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Database error".to_string(),
                )
            }
            ApiError::Other(ref err) => {
                error!(error = %err, "Unhandled error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    err.to_string(),
                )
            }
            ApiError::Common(ref err) => {
                error!(error = %err, "Common error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    err.to_string(),
                )
            }
        };

        (status, Json(ErrorResponse::new(error_code, message))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
