//! Per-user dashboard

use axum::{extract::State, Extension, Json};
use lumora_common::scoring::average;
use serde::Serialize;

use super::reviews::ReviewWithApp;
use super::session::CurrentUser;
use crate::db::{apps, reviews};
use crate::{ApiResult, AppState};

/// Reviews shown under "recent activity"
const RECENT_REVIEWS: i64 = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub apps_count: i64,
    pub reviews_received: usize,
    pub reviews_given: i64,
    /// Mean overall score of reviews received, 0 without any
    pub average_score: f64,
    pub recent_reviews: Vec<ReviewWithApp>,
}

/// GET /api/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<DashboardResponse>> {
    let user_id = current.id();

    let apps_count = apps::count_by_owner(&state.db, user_id).await?;
    let received = reviews::received_scores(&state.db, user_id).await?;
    let reviews_given = reviews::count_by_reviewer(&state.db, user_id).await?;
    let recent = reviews::list_received(&state.db, user_id, RECENT_REVIEWS).await?;

    Ok(Json(DashboardResponse {
        apps_count,
        reviews_received: received.len(),
        reviews_given,
        average_score: average(received.iter().copied()),
        recent_reviews: recent.into_iter().map(ReviewWithApp::from).collect(),
    }))
}
