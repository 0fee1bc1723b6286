//! AI-moderated interview endpoints

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use lumora_common::db::{GuideSection, Interview, InterviewStatus, Message, MessageRole, Study};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{required, JsonBody};
use super::session::CurrentUser;
use super::studies::load_owned_study;
use crate::db::{guides, interviews, settings};
use crate::services::interviewer::{self, Progress};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartInterviewRequest {
    pub study_id: Option<String>,
    pub participant_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInterviewsQuery {
    pub study_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequestBody {
    pub message: Option<String>,
}

/// Interview with its estimated progress through the guide
#[derive(Debug, Serialize)]
pub struct InterviewView {
    #[serde(flatten)]
    pub interview: Interview,
    pub progress: Progress,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub user_message: Message,
    pub ai_message: Message,
    pub progress: Progress,
}

/// Loads the interview and checks the caller owns its study
async fn load_owned_interview(
    state: &AppState,
    id: &str,
    current: &CurrentUser,
) -> ApiResult<(Interview, Study)> {
    let interview = interviews::get_interview(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Interview not found".to_string()))?;
    let study = load_owned_study(state, &interview.study_id, current).await?;
    Ok((interview, study))
}

async fn progress_for(state: &AppState, sections: &[GuideSection], messages: &[Message]) -> ApiResult<Progress> {
    let per_section = settings::get_interview_questions_per_section(&state.db).await?;
    Ok(Progress::estimate(sections.len(), messages, per_section))
}

async fn view(state: &AppState, interview: Interview) -> ApiResult<InterviewView> {
    let sections = guides::sections_for_study(&state.db, &interview.study_id).await?;
    let progress = progress_for(state, &sections, &interview.messages).await?;
    Ok(InterviewView { interview, progress })
}

/// POST /api/interview
///
/// **Request:** `{"studyId": "...", "participantName": "..."}`
/// **Response:** interview whose transcript holds the moderator's opening message
pub async fn start_interview(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    JsonBody(payload): JsonBody<StartInterviewRequest>,
) -> ApiResult<Json<InterviewView>> {
    let message = "studyId and participantName are required";
    let study_id = required(payload.study_id.as_deref(), message)?;
    let participant = required(payload.participant_name.as_deref(), message)?;

    let study = load_owned_study(&state, study_id, &current).await?;
    let sections = guides::sections_for_study(&state.db, &study.id).await?;

    let opening = interviewer::opening_message(state.chat.as_ref(), &study, participant, &sections).await?;
    let interview = interviews::create_started(
        &state.db,
        &study.id,
        participant,
        Message::new(MessageRole::Ai, opening),
    )
    .await?;

    info!(interview_id = %interview.id, study_id = %study.id, "Interview started");

    let progress = progress_for(&state, &sections, &interview.messages).await?;
    Ok(Json(InterviewView { interview, progress }))
}

/// GET /api/interview?studyId=
pub async fn list_interviews(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<ListInterviewsQuery>,
) -> ApiResult<Json<Vec<InterviewView>>> {
    let study_id = required(query.study_id.as_deref(), "studyId is required")?;
    let study = load_owned_study(&state, study_id, &current).await?;

    let sections = guides::sections_for_study(&state.db, &study.id).await?;
    let per_section = settings::get_interview_questions_per_section(&state.db).await?;

    let views = interviews::list_for_study(&state.db, &study.id)
        .await?
        .into_iter()
        .map(|interview| InterviewView {
            progress: Progress::estimate(sections.len(), &interview.messages, per_section),
            interview,
        })
        .collect();

    Ok(Json(views))
}

/// GET /api/interview/:id
pub async fn get_interview(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<InterviewView>> {
    let (interview, _) = load_owned_interview(&state, &id, &current).await?;
    Ok(Json(view(&state, interview).await?))
}

/// POST /api/interview/:id/chat
///
/// Appends the participant's message and the moderator's reply.
///
/// **Errors:**
/// - 400 Bad Request: blank message, or the interview has ended
/// - 404 Not Found: no such interview
/// - 502 Bad Gateway: the model call failed
pub async fn chat(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<ChatRequestBody>,
) -> ApiResult<Json<ChatResponse>> {
    let content = required(payload.message.as_deref(), "Message is required")?.to_string();

    let (interview, study) = load_owned_interview(&state, &id, &current).await?;
    if interview.status == InterviewStatus::Completed {
        return Err(ApiError::BadRequest("Interview has already ended".to_string()));
    }

    let sections = guides::sections_for_study(&state.db, &study.id).await?;

    let user_message = Message::new(MessageRole::Participant, content);
    let mut messages = interview.messages.0;
    messages.push(user_message.clone());

    let reply = interviewer::next_message(
        state.chat.as_ref(),
        &study,
        &interview.participant_name,
        &sections,
        &messages,
    )
    .await?;

    let ai_message = Message::new(MessageRole::Ai, reply);
    messages.push(ai_message.clone());
    interviews::save_messages(&state.db, &interview.id, &messages).await?;

    let progress = progress_for(&state, &sections, &messages).await?;
    Ok(Json(ChatResponse {
        user_message,
        ai_message,
        progress,
    }))
}

/// POST /api/interview/:id/end
///
/// Ending twice keeps the first completion time.
pub async fn end_interview(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<InterviewView>> {
    let (interview, _) = load_owned_interview(&state, &id, &current).await?;

    let interview = interviews::complete(&state.db, &interview.id).await?;
    info!(interview_id = %interview.id, messages = interview.messages.len(), "Interview ended");

    Ok(Json(view(&state, interview).await?))
}
