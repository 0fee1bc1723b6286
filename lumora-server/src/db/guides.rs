//! Discussion guide queries (one guide per study)

use chrono::Utc;
use lumora_common::db::{DiscussionGuide, GuideSection};
use lumora_common::{Error, Result};
use sqlx::types::Json;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

pub async fn get_for_study(db: &Pool<Sqlite>, study_id: &str) -> Result<Option<DiscussionGuide>> {
    let guide = sqlx::query_as::<_, DiscussionGuide>("SELECT * FROM discussion_guides WHERE study_id = ?")
        .bind(study_id)
        .fetch_optional(db)
        .await?;
    Ok(guide)
}

/// Sections of a study's guide, empty when it has none
pub async fn sections_for_study(db: &Pool<Sqlite>, study_id: &str) -> Result<Vec<GuideSection>> {
    Ok(get_for_study(db, study_id)
        .await?
        .map(|guide| guide.sections.0)
        .unwrap_or_default())
}

/// Create the study's guide or replace its sections
pub async fn upsert(db: &Pool<Sqlite>, study_id: &str, sections: &[GuideSection]) -> Result<DiscussionGuide> {
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO discussion_guides (id, study_id, sections, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(study_id) DO UPDATE
        SET sections = excluded.sections, updated_at = excluded.updated_at
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(study_id)
    .bind(Json(sections))
    .bind(now)
    .bind(now)
    .execute(db)
    .await?;

    get_for_study(db, study_id)
        .await?
        .ok_or_else(|| Error::Internal("Guide missing after upsert".to_string()))
}

/// Replace the sections of an existing guide
///
/// Returns `None` when the study has no guide yet.
pub async fn update_sections(
    db: &Pool<Sqlite>,
    study_id: &str,
    sections: &[GuideSection],
) -> Result<Option<DiscussionGuide>> {
    let result = sqlx::query("UPDATE discussion_guides SET sections = ?, updated_at = ? WHERE study_id = ?")
        .bind(Json(sections))
        .bind(Utc::now())
        .bind(study_id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_for_study(db, study_id).await
}
