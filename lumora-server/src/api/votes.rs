//! Helpful / unhelpful votes on reviews

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use lumora_common::db::ReviewVote;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::JsonBody;
use super::session::CurrentUser;
use crate::db::reviews as review_db;
use crate::db::votes::{self, VoteCounts};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub helpful: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub vote: ReviewVote,
}

/// POST /api/apps/:id/reviews/:review_id/vote
///
/// **Request:** `{"helpful": true}`
///
/// Voting again replaces the caller's previous vote.
///
/// **Errors:**
/// - 400 Bad Request: `helpful` missing or not a boolean
/// - 403 Forbidden: voting on your own review
/// - 404 Not Found: review missing or not on this app
pub async fn cast_vote(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((app_id, review_id)): Path<(String, String)>,
    JsonBody(payload): JsonBody<VoteRequest>,
) -> ApiResult<Json<VoteResponse>> {
    let helpful = payload
        .helpful
        .as_ref()
        .and_then(serde_json::Value::as_bool)
        .ok_or_else(|| ApiError::BadRequest("helpful must be a boolean".to_string()))?;

    let review = review_db::get_review_for_app(&state.db, &app_id, &review_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Review not found".to_string()))?;

    if review.reviewer_id == current.id() {
        return Err(ApiError::Forbidden("You cannot vote on your own review".to_string()));
    }

    let vote = votes::upsert_vote(&state.db, &review.id, current.id(), helpful).await?;
    debug!(review_id = %review.id, helpful, "Vote recorded");

    Ok(Json(VoteResponse { vote }))
}

/// GET /api/apps/:id/reviews/:review_id/vote
pub async fn vote_counts(
    State(state): State<AppState>,
    Path((app_id, review_id)): Path<(String, String)>,
) -> ApiResult<Json<VoteCounts>> {
    let review = review_db::get_review_for_app(&state.db, &app_id, &review_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Review not found".to_string()))?;

    Ok(Json(votes::counts_for_review(&state.db, &review.id).await?))
}
