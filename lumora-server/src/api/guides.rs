//! Discussion guide generation and editing

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use lumora_common::db::GuideSection;
use serde::Deserialize;
use tracing::info;

use super::JsonBody;
use super::session::CurrentUser;
use super::studies::{load_owned_study, GuideView};
use crate::db::guides;
use crate::services::guide_generator;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct UpdateGuideRequest {
    pub sections: Option<serde_json::Value>,
}

/// POST /api/studies/:id/generate-guide
///
/// Asks the model for a fresh guide and replaces any existing one.
///
/// **Errors:** 502 Bad Gateway when the model fails or returns no usable sections
pub async fn generate_guide(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(study_id): Path<String>,
) -> ApiResult<Json<GuideView>> {
    let study = load_owned_study(&state, &study_id, &current).await?;

    let sections = guide_generator::generate_guide(state.chat.as_ref(), &study).await?;
    let guide = guides::upsert(&state.db, &study.id, &sections).await?;

    info!(study_id = %study.id, sections = sections.len(), "Discussion guide generated");
    Ok(Json(GuideView::from(guide)))
}

/// PUT /api/studies/:id/generate-guide
pub async fn update_guide(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(study_id): Path<String>,
    JsonBody(payload): JsonBody<UpdateGuideRequest>,
) -> ApiResult<Json<GuideView>> {
    let study = load_owned_study(&state, &study_id, &current).await?;

    let sections: Vec<GuideSection> = payload
        .sections
        .ok_or_else(|| ApiError::BadRequest("Sections are required".to_string()))
        .and_then(|value| {
            serde_json::from_value(value)
                .map_err(|e| ApiError::BadRequest(format!("Invalid sections: {}", e)))
        })?;

    let guide = guides::update_sections(&state.db, &study.id, &sections)
        .await?
        .ok_or_else(|| ApiError::NotFound("No discussion guide to update".to_string()))?;

    info!(study_id = %study.id, sections = sections.len(), "Discussion guide updated");
    Ok(Json(GuideView::from(guide)))
}
