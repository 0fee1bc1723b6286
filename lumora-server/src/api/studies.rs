//! Research study endpoints
//!
//! Studies, and everything hanging off them, are visible to their owner only.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use lumora_common::api::MessageResponse;
use lumora_common::db::{DiscussionGuide, GuideSection, Study, StudyType};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::session::CurrentUser;
use super::{ensure_owner, required, JsonBody};
use crate::db::studies::{self as study_db, StudyWithCounts};
use crate::db::guides;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudyRequest {
    pub name: Option<String>,
    pub goal: Option<String>,
    pub target_audience: Option<String>,
    #[serde(rename = "type")]
    pub study_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyListItem {
    #[serde(flatten)]
    pub study: Study,
    pub interview_count: i64,
    pub insight_count: i64,
}

impl From<StudyWithCounts> for StudyListItem {
    fn from(row: StudyWithCounts) -> Self {
        Self {
            study: row.study,
            interview_count: row.interview_count,
            insight_count: row.insight_count,
        }
    }
}

/// Guide as returned to clients
#[derive(Debug, Serialize)]
pub struct GuideView {
    pub id: String,
    pub sections: Vec<GuideSection>,
}

impl From<DiscussionGuide> for GuideView {
    fn from(guide: DiscussionGuide) -> Self {
        Self {
            id: guide.id,
            sections: guide.sections.0,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyDetail {
    pub study: Study,
    pub guide: Option<GuideView>,
    pub interview_count: i64,
    pub insight_count: i64,
}

/// Load a study the caller owns (404 / 403 otherwise)
pub(crate) async fn load_owned_study(state: &AppState, id: &str, current: &CurrentUser) -> ApiResult<Study> {
    let study = study_db::get_study(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Study not found".to_string()))?;
    ensure_owner(&study.user_id, current, "You do not have access to this study")?;
    Ok(study)
}

/// GET /api/studies
pub async fn list_studies(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<StudyListItem>>> {
    let rows = study_db::list_by_owner(&state.db, current.id()).await?;
    Ok(Json(rows.into_iter().map(StudyListItem::from).collect()))
}

/// POST /api/studies
///
/// **Request:** `{"name", "goal", "targetAudience", "type"}` where `type` is
/// one of `exploratory`, `concept_test`, `usability_test`, `journey_map`
pub async fn create_study(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    JsonBody(payload): JsonBody<CreateStudyRequest>,
) -> ApiResult<(StatusCode, Json<Study>)> {
    let message = "All fields are required";
    let name = required(payload.name.as_deref(), message)?;
    let goal = required(payload.goal.as_deref(), message)?;
    let target_audience = required(payload.target_audience.as_deref(), message)?;
    let study_type = required(payload.study_type.as_deref(), message)?
        .parse::<StudyType>()
        .map_err(|_| ApiError::BadRequest("Invalid study type".to_string()))?;

    let study =
        study_db::create_study(&state.db, current.id(), name, goal, target_audience, study_type).await?;

    info!(study_id = %study.id, study_type = study.study_type.label(), "Study created");
    Ok((StatusCode::CREATED, Json(study)))
}

/// GET /api/studies/:id
pub async fn get_study(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<StudyDetail>> {
    let row = study_db::get_study_with_counts(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Study not found".to_string()))?;
    ensure_owner(&row.study.user_id, &current, "You do not have access to this study")?;

    let guide = guides::get_for_study(&state.db, &id).await?.map(GuideView::from);

    Ok(Json(StudyDetail {
        study: row.study,
        guide,
        interview_count: row.interview_count,
        insight_count: row.insight_count,
    }))
}

/// DELETE /api/studies/:id
///
/// Removes the guide, interviews and insights with it.
pub async fn delete_study(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let study = load_owned_study(&state, &id, &current).await?;
    study_db::delete_study(&state.db, &study.id).await?;
    info!(study_id = %study.id, "Study deleted");
    Ok(Json(MessageResponse::new("Study deleted")))
}
