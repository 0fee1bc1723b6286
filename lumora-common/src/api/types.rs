//! Shared API request/response types

use serde::{Deserialize, Serialize};

// ========================================
// Error Response Types
// ========================================

/// Error body returned by every failing endpoint
///
/// # Examples
///
/// ```
/// use lumora_common::api::types::ErrorResponse;
///
/// let body = ErrorResponse::new("NOT_FOUND", "App not found");
/// let json = serde_json::to_value(&body).unwrap();
/// assert_eq!(json["error"]["code"], "NOT_FOUND");
/// assert_eq!(json["error"]["message"], "App not found");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Machine-readable code plus human-readable message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

/// `{"message": "..."}` acknowledgement for deletes and password changes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ========================================
// Tests
// ========================================
