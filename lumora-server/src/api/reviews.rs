//! Review endpoints, owner responses and AI reviews

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use lumora_common::api::MessageResponse;
use lumora_common::db::{ensure_ai_reviewer, App, Review, AI_REVIEWER_ID};
use lumora_common::scoring::{is_category, summarize, Ratings, ReviewSummary, MAX_RATING, MIN_RATING};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use super::session::CurrentUser;
use super::{ensure_owner, required, JsonBody};
use crate::db::apps as app_db;
use crate::db::reviews::{self as review_db, NewReview, ReviewDetail};
use crate::db::users::UserSummary;
use crate::db::votes::{self, VoteCounts};
use crate::services::app_reviewer;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub ratings: Option<BTreeMap<String, serde_json::Value>>,
    pub feedback: Option<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub response: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerResponseView {
    pub owner_response: String,
    pub owner_responded_at: DateTime<Utc>,
}

/// Review as listed on an app page
#[derive(Debug, Serialize)]
pub struct AppReviewView {
    #[serde(flatten)]
    pub review: Review,
    pub reviewer: UserSummary,
    pub votes: VoteCounts,
}

#[derive(Debug, Serialize)]
pub struct AppRef {
    pub id: String,
    pub name: String,
}

/// Review with the app it belongs to
#[derive(Debug, Serialize)]
pub struct ReviewWithApp {
    #[serde(flatten)]
    pub review: Review,
    pub reviewer: UserSummary,
    pub app: AppRef,
}

impl From<ReviewDetail> for ReviewWithApp {
    fn from(detail: ReviewDetail) -> Self {
        Self {
            reviewer: UserSummary {
                name: detail.reviewer_name,
                email: detail.reviewer_email,
            },
            app: AppRef {
                id: detail.review.app_id.clone(),
                name: detail.app_name,
            },
            review: detail.review,
        }
    }
}

/// Validate submitted ratings: known categories, numeric, within 1..=10
fn validate_ratings(raw: Option<BTreeMap<String, serde_json::Value>>) -> ApiResult<Ratings> {
    let raw = raw
        .filter(|r| !r.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Ratings and feedback are required".to_string()))?;

    let mut ratings = Ratings::new();
    for (key, value) in raw {
        if !is_category(&key) {
            return Err(ApiError::BadRequest(format!("Unknown rating category: {}", key)));
        }
        let score = value
            .as_f64()
            .filter(|v| (MIN_RATING..=MAX_RATING).contains(v))
            .ok_or_else(|| {
                ApiError::BadRequest(format!(
                    "Rating for {} must be a number between {} and {}",
                    key, MIN_RATING, MAX_RATING
                ))
            })?;
        ratings.insert(key, score);
    }

    Ok(ratings)
}

async fn load_app(state: &AppState, app_id: &str) -> ApiResult<App> {
    app_db::get_app(&state.db, app_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("App not found".to_string()))
}

async fn load_review(state: &AppState, app_id: &str, review_id: &str) -> ApiResult<Review> {
    review_db::get_review_for_app(&state.db, app_id, review_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Review not found".to_string()))
}

/// Generate and store the AI review of `app`
///
/// Creates the AI reviewer account on first use.
pub(crate) async fn create_ai_review(state: &AppState, app: &App) -> ApiResult<Review> {
    let generated = app_reviewer::generate_review(state.chat.as_ref(), app).await?;
    ensure_ai_reviewer(&state.db).await?;

    let review = review_db::create_review(
        &state.db,
        &app.id,
        AI_REVIEWER_ID,
        NewReview {
            is_ai: true,
            ratings: generated.ratings,
            feedback: generated.feedback,
            suggestions: generated.suggestions,
        },
    )
    .await?;

    info!(app_id = %app.id, review_id = %review.id, score = review.overall_score, "AI review stored");
    Ok(review)
}

/// POST /api/apps/:id/reviews
///
/// **Request:** `{"ratings": {"uiDesign": 8, ...}, "feedback": "...", "suggestions": [...]}`
///
/// **Errors:**
/// - 400 Bad Request: empty ratings, blank feedback, unknown category, out-of-range value
/// - 404 Not Found: no such app
/// - 409 Conflict: caller already reviewed this app
pub async fn create_review(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(app_id): Path<String>,
    JsonBody(payload): JsonBody<CreateReviewRequest>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    let ratings = validate_ratings(payload.ratings)?;
    let feedback = required(payload.feedback.as_deref(), "Ratings and feedback are required")?.to_string();

    load_app(&state, &app_id).await?;

    let review = review_db::create_review(
        &state.db,
        &app_id,
        current.id(),
        NewReview {
            is_ai: false,
            ratings,
            feedback,
            suggestions: payload.suggestions,
        },
    )
    .await?;

    info!(app_id = %app_id, review_id = %review.id, "Review created");
    Ok((StatusCode::CREATED, Json(review)))
}

/// GET /api/apps/:id/reviews
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(app_id): Path<String>,
) -> ApiResult<Json<Vec<AppReviewView>>> {
    load_app(&state, &app_id).await?;

    let details = review_db::list_for_app(&state.db, &app_id).await?;
    let counts = votes::counts_for_app(&state.db, &app_id).await?;

    let views = details
        .into_iter()
        .map(|detail| AppReviewView {
            votes: counts.get(&detail.review.id).copied().unwrap_or_default(),
            reviewer: UserSummary {
                name: detail.reviewer_name,
                email: detail.reviewer_email,
            },
            review: detail.review,
        })
        .collect();

    Ok(Json(views))
}

/// DELETE /api/apps/:id/reviews/:review_id (author only)
pub async fn delete_review(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((app_id, review_id)): Path<(String, String)>,
) -> ApiResult<Json<MessageResponse>> {
    let review = load_review(&state, &app_id, &review_id).await?;
    ensure_owner(&review.reviewer_id, &current, "You can only delete your own reviews")?;

    review_db::delete_review(&state.db, &review.id).await?;
    info!(review_id = %review.id, "Review deleted");
    Ok(Json(MessageResponse::new("Review deleted")))
}

/// PUT /api/apps/:id/reviews/:review_id/respond (app owner only)
///
/// A second response replaces the first.
pub async fn respond_to_review(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((app_id, review_id)): Path<(String, String)>,
    JsonBody(payload): JsonBody<RespondRequest>,
) -> ApiResult<Json<OwnerResponseView>> {
    let response = required(payload.response.as_deref(), "Response is required")?.to_string();

    let app = load_app(&state, &app_id).await?;
    ensure_owner(&app.user_id, &current, "Only the app owner can respond to reviews")?;
    let review = load_review(&state, &app_id, &review_id).await?;

    let responded_at = review_db::set_owner_response(&state.db, &review.id, &response).await?;
    info!(review_id = %review.id, "Owner responded to review");

    Ok(Json(OwnerResponseView {
        owner_response: response,
        owner_responded_at: responded_at,
    }))
}

/// GET /api/apps/:id/reviews/summary
pub async fn review_summary(
    State(state): State<AppState>,
    Path(app_id): Path<String>,
) -> ApiResult<Json<ReviewSummary>> {
    load_app(&state, &app_id).await?;
    let rows = review_db::ratings_for_app(&state.db, &app_id).await?;
    Ok(Json(summarize(rows.iter().map(|(is_ai, ratings)| (*is_ai, ratings)))))
}

/// GET /api/reviews/mine
pub async fn my_reviews(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<ReviewWithApp>>> {
    let details = review_db::list_by_reviewer(&state.db, current.id()).await?;
    Ok(Json(details.into_iter().map(ReviewWithApp::from).collect()))
}

/// POST /api/apps/:id/ai-review
///
/// **Errors:**
/// - 404 Not Found: no such app
/// - 409 Conflict: the app already has an AI review
/// - 502 Bad Gateway: the model call failed or its reply was unusable
pub async fn request_ai_review(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(app_id): Path<String>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    let app = load_app(&state, &app_id).await?;

    if review_db::has_ai_review(&state.db, &app.id).await? {
        return Err(ApiError::Conflict("AI review already exists for this app".to_string()));
    }

    info!(app_id = %app.id, requested_by = %current.id(), "Generating AI review");
    let review = create_ai_review(&state, &app).await?;
    Ok((StatusCode::CREATED, Json(review)))
}
