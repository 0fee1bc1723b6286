//! Signup, login and logout
//!
//! Successful signup/login returns the session token in the body and also
//! sets it as the `lumora_session` cookie for browser clients.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use lumora_common::api::{hash_password, verify_password, MessageResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::session::{CurrentUser, SESSION_COOKIE};
use super::users::UserView;
use super::{normalize_email, required, JsonBody};
use crate::db::{sessions, settings, users};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserView,
    pub token: String,
}

fn session_cookie(token: &str, max_age_seconds: i64) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_seconds
    )
}

/// Reject passwords shorter than the configured minimum
pub(crate) async fn check_password_length(state: &AppState, password: &str) -> ApiResult<()> {
    let min_length = settings::get_min_password_length(&state.db).await?;
    if password.chars().count() < min_length {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            min_length
        )));
    }
    Ok(())
}

/// Hash `password` on the blocking pool
pub(crate) async fn hash_password_blocking(password: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("Password hashing task failed: {}", e)))?
        .map_err(ApiError::from)
}

/// Verify `password` against `stored_hash` on the blocking pool
pub(crate) async fn verify_password_blocking(password: String, stored_hash: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| ApiError::Internal(format!("Password check task failed: {}", e)))
}

/// POST /api/auth/signup
///
/// **Request:** `{"name": "...", "email": "...", "password": "..."}`
/// **Response:** 201 `{"user": {...}, "token": "..."}`
///
/// **Errors:**
/// - 400 Bad Request: missing field, malformed email, short password
/// - 409 Conflict: email already registered
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    let name = required(payload.name.as_deref(), "Name, email and password are required")?;
    let email = normalize_email(required(
        payload.email.as_deref(),
        "Name, email and password are required",
    )?)?;
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Name, email and password are required".to_string()))?;

    check_password_length(&state, &password).await?;

    let password_hash = hash_password_blocking(password).await?;
    let user = users::create_user(&state.db, name, &email, &password_hash).await?;
    let ttl = settings::get_session_timeout_seconds(&state.db).await?;
    let token = sessions::create_session(&state.db, &user.id, ttl).await?;

    info!(user_id = %user.id, "User signed up");

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, session_cookie(&token, ttl))],
        Json(AuthResponse {
            user: UserView::from(&user),
            token,
        }),
    ))
}

/// POST /api/auth/login
///
/// Unknown email and wrong password are indistinguishable (401).
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(ApiError::BadRequest("Email and password are required".to_string()));
    };

    let email = email.trim().to_lowercase();
    let user = users::find_by_email(&state.db, &email)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    if !verify_password_blocking(password, user.password_hash.clone()).await? {
        return Err(ApiError::Unauthorized);
    }

    let ttl = settings::get_session_timeout_seconds(&state.db).await?;
    let token = sessions::create_session(&state.db, &user.id, ttl).await?;

    info!(user_id = %user.id, "User logged in");

    Ok((
        [(header::SET_COOKIE, session_cookie(&token, ttl))],
        Json(AuthResponse {
            user: UserView::from(&user),
            token,
        }),
    ))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    sessions::delete_session(&state.db, &current.token).await?;
    info!(user_id = %current.id(), "User logged out");

    Ok((
        [(header::SET_COOKIE, session_cookie("", 0))],
        Json(MessageResponse::new("Logged out")),
    ))
}
