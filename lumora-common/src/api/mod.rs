//! Credential primitives and response bodies shared with the server
//!
//! Nothing here depends on axum; `lumora-server` adapts these into
//! extractors and error responses.

pub mod auth;
pub mod types;

pub use auth::{generate_session_token, hash_password, hash_token, verify_password};
pub use types::{ErrorDetail, ErrorResponse, MessageResponse};
