//! Insight synthesis endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use lumora_common::db::Insight;
use tracing::info;

use super::session::CurrentUser;
use super::studies::load_owned_study;
use crate::db::{insights, interviews};
use crate::services::synthesizer;
use crate::{ApiError, ApiResult, AppState};

/// POST /api/studies/:id/synthesize
///
/// Every run stores a new insight; earlier ones are kept.
///
/// **Errors:**
/// - 400 Bad Request: the study has no completed interviews
/// - 502 Bad Gateway: the model failed or replied with unusable JSON
pub async fn synthesize(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(study_id): Path<String>,
) -> ApiResult<Json<Insight>> {
    let study = load_owned_study(&state, &study_id, &current).await?;

    let completed = interviews::list_completed(&state.db, &study.id).await?;
    if completed.is_empty() {
        return Err(ApiError::BadRequest("No completed interviews to synthesize".to_string()));
    }

    let synthesis = synthesizer::synthesize(state.chat.as_ref(), &study, &completed).await?;
    let insight = insights::create_insight(
        &state.db,
        &study.id,
        synthesis.summary,
        synthesis.themes,
        synthesis.recommendations,
    )
    .await?;

    info!(
        study_id = %study.id,
        interviews = completed.len(),
        themes = insight.themes.len(),
        "Insights synthesized"
    );
    Ok(Json(insight))
}

/// GET /api/studies/:id/insights
pub async fn latest_insight(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(study_id): Path<String>,
) -> ApiResult<Json<Insight>> {
    let study = load_owned_study(&state, &study_id, &current).await?;

    insights::latest_for_study(&state.db, &study.id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No insights yet".to_string()))
}
