//! Interview transcript queries

use chrono::Utc;
use lumora_common::db::{Interview, InterviewStatus, Message};
use lumora_common::{Error, Result};
use sqlx::types::Json;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

/// Start an interview whose transcript opens with `first_message`
pub async fn create_started(
    db: &Pool<Sqlite>,
    study_id: &str,
    participant_name: &str,
    first_message: Message,
) -> Result<Interview> {
    let now = Utc::now();
    let interview = Interview {
        id: Uuid::new_v4().to_string(),
        study_id: study_id.to_string(),
        participant_name: participant_name.to_string(),
        status: InterviewStatus::InProgress,
        messages: Json(vec![first_message]),
        started_at: Some(now),
        completed_at: None,
        created_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO interviews (id, study_id, participant_name, status, messages, started_at, completed_at, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&interview.id)
    .bind(&interview.study_id)
    .bind(&interview.participant_name)
    .bind(interview.status)
    .bind(&interview.messages)
    .bind(interview.started_at)
    .bind(interview.completed_at)
    .bind(interview.created_at)
    .execute(db)
    .await?;

    Ok(interview)
}

pub async fn get_interview(db: &Pool<Sqlite>, id: &str) -> Result<Option<Interview>> {
    let interview = sqlx::query_as::<_, Interview>("SELECT * FROM interviews WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(interview)
}

/// Interviews of a study, newest first
pub async fn list_for_study(db: &Pool<Sqlite>, study_id: &str) -> Result<Vec<Interview>> {
    let interviews = sqlx::query_as::<_, Interview>(
        "SELECT * FROM interviews WHERE study_id = ? ORDER BY created_at DESC, rowid DESC",
    )
    .bind(study_id)
    .fetch_all(db)
    .await?;
    Ok(interviews)
}

/// Completed interviews of a study, oldest first
pub async fn list_completed(db: &Pool<Sqlite>, study_id: &str) -> Result<Vec<Interview>> {
    let interviews = sqlx::query_as::<_, Interview>(
        "SELECT * FROM interviews WHERE study_id = ? AND status = ? ORDER BY created_at, rowid",
    )
    .bind(study_id)
    .bind(InterviewStatus::Completed)
    .fetch_all(db)
    .await?;
    Ok(interviews)
}

/// Overwrite the transcript
pub async fn save_messages(db: &Pool<Sqlite>, id: &str, messages: &[Message]) -> Result<()> {
    sqlx::query("UPDATE interviews SET messages = ? WHERE id = ?")
        .bind(Json(messages))
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

/// Mark an interview completed, keeping the first completion time
pub async fn complete(db: &Pool<Sqlite>, id: &str) -> Result<Interview> {
    sqlx::query(
        "UPDATE interviews SET status = ?, completed_at = COALESCE(completed_at, ?) WHERE id = ?",
    )
    .bind(InterviewStatus::Completed)
    .bind(Utc::now())
    .bind(id)
    .execute(db)
    .await?;

    get_interview(db, id)
        .await?
        .ok_or_else(|| Error::NotFound("Interview not found".to_string()))
}
