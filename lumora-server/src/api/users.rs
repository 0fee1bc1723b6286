//! Current-user profile endpoints

use axum::{extract::State, Extension, Json};
use lumora_common::api::MessageResponse;
use lumora_common::db::{User, UserRole};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::auth::{check_password_length, hash_password_blocking, verify_password_blocking};
use super::session::CurrentUser;
use super::{normalize_email, required, JsonBody};
use crate::db::users;
use crate::{ApiError, ApiResult, AppState};

/// Account fields returned to the account owner
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// GET /api/user/me
pub async fn me(Extension(current): Extension<CurrentUser>) -> Json<UserView> {
    Json(UserView::from(&current.user))
}

/// PUT /api/user/profile
///
/// **Errors:**
/// - 400 Bad Request: name or email missing
/// - 409 Conflict: email belongs to another user
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    JsonBody(payload): JsonBody<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileView>> {
    let name = required(payload.name.as_deref(), "Name and email are required")?;
    let email = normalize_email(required(payload.email.as_deref(), "Name and email are required")?)?;

    let user = users::update_profile(&state.db, current.id(), name, &email).await?;
    info!(user_id = %user.id, "Profile updated");

    Ok(Json(ProfileView {
        id: user.id,
        name: user.name,
        email: user.email,
    }))
}

/// PUT /api/user/password
///
/// **Errors:**
/// - 400 Bad Request: missing field or new password too short
/// - 403 Forbidden: current password is wrong
/// - 404 Not Found: the account has no password (e.g. the AI reviewer)
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    JsonBody(payload): JsonBody<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let (Some(current_password), Some(new_password)) = (
        payload.current_password.filter(|p| !p.is_empty()),
        payload.new_password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::BadRequest(
            "Current password and new password are required".to_string(),
        ));
    };

    check_password_length(&state, &new_password).await?;

    let user = &current.user;
    if !user.has_password() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    if !verify_password_blocking(current_password, user.password_hash.clone()).await? {
        return Err(ApiError::Forbidden("Current password is incorrect".to_string()));
    }

    let password_hash = hash_password_blocking(new_password).await?;
    users::update_password(&state.db, &user.id, &password_hash).await?;
    info!(user_id = %user.id, "Password changed");

    Ok(Json(MessageResponse::new("Password updated successfully")))
}
