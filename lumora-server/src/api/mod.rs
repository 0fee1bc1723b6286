//! HTTP API handlers for lumora-server

pub mod apps;
pub mod auth;
pub mod dashboard;
pub mod guides;
pub mod health;
pub mod insights;
pub mod interviews;
pub mod json;
pub mod reviews;
pub mod session;
pub mod studies;
pub mod users;
pub mod votes;

pub use health::health_routes;
pub use json::JsonBody;
pub use session::CurrentUser;

use crate::{ApiError, ApiResult};

/// Trimmed value of a required text field, 400 with `message` when blank
pub(crate) fn required<'a>(value: Option<&'a str>, message: &str) -> ApiResult<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(message.to_string()))
}

/// Trim an optional text field, mapping blank to `None`
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Lowercase and trim an email, requiring an `@`
pub(crate) fn normalize_email(email: &str) -> ApiResult<String> {
    let email = email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(ApiError::BadRequest("Invalid email address".to_string()));
    }
    Ok(email)
}

/// 403 unless `owner_id` is the caller
pub(crate) fn ensure_owner(owner_id: &str, current: &CurrentUser, message: &str) -> ApiResult<()> {
    if owner_id != current.id() {
        return Err(ApiError::Forbidden(message.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required(Some("  Taskly "), "msg").unwrap(), "Taskly");
        assert!(required(Some("   "), "msg").is_err());
        assert!(required(None, "msg").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" Ana@Example.COM ").unwrap(), "ana@example.com");
        assert!(normalize_email("not-an-email").is_err());
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(Some(" x ".to_string())), Some("x".to_string()));
        assert_eq!(optional_text(Some("".to_string())), None);
        assert_eq!(optional_text(None), None);
    }
}
