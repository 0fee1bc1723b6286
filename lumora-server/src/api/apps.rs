//! Marketplace app endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use lumora_common::api::MessageResponse;
use lumora_common::db::{App, AppStatus};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::types::Json as JsonColumn;
use std::time::Duration;
use tracing::{info, warn};

use super::session::CurrentUser;
use super::{ensure_owner, optional_text, required, JsonBody};
use crate::db::apps::{self as app_db, AppWithOwner, NewApp};
use crate::db::reviews::{self as review_db, ReviewStats};
use crate::db::settings;
use crate::db::users::UserSummary;
use crate::services::site_analyzer::{self, SiteFetchError};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub target_audience: Option<String>,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub screenshots: Vec<String>,
}

/// Partial update; absent fields are left alone
///
/// `url` and `targetAudience` distinguish absent (keep) from `null` (clear).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub target_audience: Option<Option<String>>,
    pub questions: Option<Vec<String>>,
    pub screenshots: Option<Vec<String>>,
    pub status: Option<String>,
}

/// Marks a field as present even when its value is `null`
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct ListAppsQuery {
    pub mine: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub app_id: String,
}

/// App card in listings
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppListItem {
    #[serde(flatten)]
    pub app: App,
    pub user: UserSummary,
    pub review_count: usize,
    pub average_score: f64,
}

/// App detail page
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDetail {
    #[serde(flatten)]
    pub app: App,
    pub user: UserSummary,
    #[serde(flatten)]
    pub stats: ReviewStats,
}

fn owner(row: &AppWithOwner) -> UserSummary {
    UserSummary {
        name: row.owner_name.clone(),
        email: row.owner_email.clone(),
    }
}

/// POST /api/apps
///
/// **Errors:** 400 Bad Request when name or description is missing
pub async fn create_app(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    JsonBody(payload): JsonBody<CreateAppRequest>,
) -> ApiResult<(StatusCode, Json<App>)> {
    let message = "Name and description are required";
    let name = required(payload.name.as_deref(), message)?.to_string();
    let description = required(payload.description.as_deref(), message)?.to_string();

    let app = app_db::create_app(
        &state.db,
        current.id(),
        NewApp {
            name,
            description,
            url: optional_text(payload.url),
            target_audience: optional_text(payload.target_audience),
            questions: payload.questions,
            screenshots: payload.screenshots,
        },
    )
    .await?;

    info!(app_id = %app.id, user_id = %current.id(), "App created");
    Ok((StatusCode::CREATED, Json(app)))
}

/// GET /api/apps
///
/// `?mine=true` lists the caller's apps in any status (session required);
/// otherwise every published app.
pub async fn list_apps(
    State(state): State<AppState>,
    current: Option<Extension<CurrentUser>>,
    Query(query): Query<ListAppsQuery>,
) -> ApiResult<Json<Vec<AppListItem>>> {
    let rows = if query.mine.as_deref() == Some("true") {
        let Some(Extension(current)) = current else {
            return Err(ApiError::Unauthorized);
        };
        app_db::list_by_owner(&state.db, current.id()).await?
    } else {
        app_db::list_published(&state.db).await?
    };

    let stats = review_db::stats_by_app(&state.db).await?;

    let items = rows
        .into_iter()
        .map(|row| {
            let app_stats = stats.get(&row.app.id).copied().unwrap_or_default();
            AppListItem {
                user: owner(&row),
                app: row.app,
                review_count: app_stats.review_count,
                average_score: app_stats.average_score,
            }
        })
        .collect();

    Ok(Json(items))
}

/// GET /api/apps/:id
pub async fn get_app(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<AppDetail>> {
    let row = app_db::get_app_with_owner(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound("App not found".to_string()))?;
    let stats = review_db::stats_for_app(&state.db, &id).await?;

    Ok(Json(AppDetail {
        user: owner(&row),
        app: row.app,
        stats,
    }))
}

/// PUT /api/apps/:id (owner only)
///
/// Blank name/description and empty question/screenshot lists are ignored.
pub async fn update_app(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateAppRequest>,
) -> ApiResult<Json<App>> {
    let mut app = app_db::get_app(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound("App not found".to_string()))?;
    ensure_owner(&app.user_id, &current, "Only the app owner can edit this app")?;

    if let Some(status) = payload.status.as_deref().filter(|s| !s.is_empty()) {
        app.status = status.parse::<AppStatus>().map_err(ApiError::BadRequest)?;
    }
    if let Some(name) = optional_text(payload.name) {
        app.name = name;
    }
    if let Some(description) = optional_text(payload.description) {
        app.description = description;
    }
    if let Some(url) = payload.url {
        app.url = optional_text(url);
    }
    if let Some(audience) = payload.target_audience {
        app.target_audience = optional_text(audience);
    }
    if let Some(questions) = payload.questions.filter(|q| !q.is_empty()) {
        app.questions = JsonColumn(questions);
    }
    if let Some(screenshots) = payload.screenshots.filter(|s| !s.is_empty()) {
        app.screenshots = JsonColumn(screenshots);
    }

    let app = app_db::update_app(&state.db, app).await?;
    info!(app_id = %app.id, status = %app.status, "App updated");
    Ok(Json(app))
}

/// DELETE /api/apps/:id (owner only)
pub async fn delete_app(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let app = app_db::get_app(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound("App not found".to_string()))?;
    ensure_owner(&app.user_id, &current, "Only the app owner can delete this app")?;

    app_db::delete_app(&state.db, &id).await?;
    info!(app_id = %id, "App deleted");
    Ok(Json(MessageResponse::new("App deleted")))
}

/// POST /api/apps/analyze
///
/// Drafts a listing from a public website, creates the app, then attempts an
/// AI review. Review failure does not fail the request.
///
/// **Errors:**
/// - 400 Bad Request: missing or non-http(s) URL
/// - 422 Unprocessable: the site could not be fetched
/// - 502 Bad Gateway: the model failed to analyze the page
pub async fn analyze_url(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    JsonBody(payload): JsonBody<AnalyzeRequest>,
) -> ApiResult<(StatusCode, Json<AnalyzeResponse>)> {
    let raw_url = required(payload.url.as_deref(), "URL is required")?;
    let url = site_analyzer::validate_url(raw_url)
        .map_err(|_| ApiError::BadRequest("Invalid URL format".to_string()))?;

    let timeout = Duration::from_millis(settings::get_site_fetch_timeout_ms(&state.db).await?);
    let max_chars = settings::get_site_content_max_chars(&state.db).await?;

    let html = site_analyzer::fetch_page(&state.http, &url, timeout, site_analyzer::MAX_PAGE_BYTES)
        .await
        .map_err(|e| match e {
            SiteFetchError::InvalidUrl => ApiError::BadRequest("Invalid URL format".to_string()),
            SiteFetchError::Unreachable(_) => ApiError::Unprocessable(
                "Could not access that URL. Make sure it's publicly accessible.".to_string(),
            ),
        })?;

    let meta = site_analyzer::extract_metadata(&html, max_chars);
    let context = site_analyzer::build_site_context(raw_url, &meta);
    let analysis = site_analyzer::analyze_site(state.chat.as_ref(), &context).await?;

    let name = optional_text(Some(analysis.name))
        .or_else(|| optional_text(Some(meta.title.clone())))
        .unwrap_or_else(|| url.host_str().unwrap_or_default().to_string());
    let description = optional_text(Some(analysis.description))
        .or_else(|| optional_text(Some(meta.meta_description.clone())))
        .unwrap_or_else(|| "No description available.".to_string());
    let screenshots = optional_text(Some(meta.og_image)).into_iter().collect();

    let app = app_db::create_app(
        &state.db,
        current.id(),
        NewApp {
            name,
            description,
            url: Some(raw_url.to_string()),
            target_audience: optional_text(Some(analysis.target_audience)),
            questions: analysis.questions,
            screenshots,
        },
    )
    .await?;
    info!(app_id = %app.id, url = %raw_url, "App created from URL analysis");

    if let Err(e) = super::reviews::create_ai_review(&state, &app).await {
        warn!(app_id = %app.id, error = %e, "AI review after URL analysis failed");
    }

    Ok((StatusCode::CREATED, Json(AnalyzeResponse { app_id: app.id })))
}
