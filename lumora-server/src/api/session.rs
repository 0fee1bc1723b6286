//! Session middleware
//!
//! A session token is accepted from `Authorization: Bearer <token>` or the
//! `lumora_session` cookie. On success the resolved [`CurrentUser`] is
//! inserted into the request extensions for handlers to extract.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use lumora_common::db::User;
use tracing::debug;

use crate::{ApiError, AppState};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "lumora_session";

/// Authenticated caller
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    /// Raw token the request presented
    pub token: String,
}

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.user.id
    }
}

/// Extract the session token from the request headers
///
/// The bearer header wins over the cookie when both are present.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|t| !t.is_empty())
}

async fn resolve(state: &AppState, headers: &HeaderMap) -> Result<Option<CurrentUser>, ApiError> {
    let Some(token) = session_token(headers) else {
        return Ok(None);
    };

    let user = crate::db::sessions::find_user_by_token(&state.db, &token).await?;
    Ok(user.map(|user| CurrentUser { user, token }))
}

/// Reject requests without a valid session (401)
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let current = resolve(&state, request.headers()).await?.ok_or_else(|| {
        debug!(path = %request.uri().path(), "Rejected request without valid session");
        ApiError::Unauthorized
    })?;

    request.extensions_mut().insert(current);
    Ok(next.run(request).await)
}

/// Attach the session user when one is presented, never rejecting
pub async fn attach_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(current) = resolve(&state, request.headers()).await? {
        request.extensions_mut().insert(current);
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(session_token(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn test_cookie_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; lumora_session=tok42; other=1"),
        );
        assert_eq!(session_token(&headers), Some("tok42".to_string()));
    }

    #[test]
    fn test_bearer_preferred_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(header::COOKIE, HeaderValue::from_static("lumora_session=from-cookie"));
        assert_eq!(session_token(&headers), Some("from-header".to_string()));
    }

    #[test]
    fn test_no_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwdw=="));
        headers.insert(header::COOKIE, HeaderValue::from_static("lumora_session="));
        assert_eq!(session_token(&headers), None);
    }
}
