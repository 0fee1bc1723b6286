//! Research study queries

use chrono::Utc;
use lumora_common::db::{Study, StudyType};
use lumora_common::Result;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

/// Study with the sizes of its interview and insight collections
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StudyWithCounts {
    #[sqlx(flatten)]
    pub study: Study,
    pub interview_count: i64,
    pub insight_count: i64,
}

const SELECT_WITH_COUNTS: &str = r#"
    SELECT s.*,
        (SELECT COUNT(*) FROM interviews i WHERE i.study_id = s.id) AS interview_count,
        (SELECT COUNT(*) FROM insights n WHERE n.study_id = s.id) AS insight_count
    FROM studies s
"#;

pub async fn create_study(
    db: &Pool<Sqlite>,
    user_id: &str,
    name: &str,
    goal: &str,
    target_audience: &str,
    study_type: StudyType,
) -> Result<Study> {
    let now = Utc::now();
    let study = Study {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        goal: goal.to_string(),
        target_audience: target_audience.to_string(),
        study_type,
        user_id: user_id.to_string(),
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO studies (id, name, goal, target_audience, study_type, user_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&study.id)
    .bind(&study.name)
    .bind(&study.goal)
    .bind(&study.target_audience)
    .bind(study.study_type)
    .bind(&study.user_id)
    .bind(study.created_at)
    .bind(study.updated_at)
    .execute(db)
    .await?;

    Ok(study)
}

pub async fn get_study(db: &Pool<Sqlite>, id: &str) -> Result<Option<Study>> {
    let study = sqlx::query_as::<_, Study>("SELECT * FROM studies WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(study)
}

pub async fn get_study_with_counts(db: &Pool<Sqlite>, id: &str) -> Result<Option<StudyWithCounts>> {
    let row = sqlx::query_as::<_, StudyWithCounts>(&format!("{} WHERE s.id = ?", SELECT_WITH_COUNTS))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

/// Studies owned by `user_id`, newest first
pub async fn list_by_owner(db: &Pool<Sqlite>, user_id: &str) -> Result<Vec<StudyWithCounts>> {
    let rows = sqlx::query_as::<_, StudyWithCounts>(&format!(
        "{} WHERE s.user_id = ? ORDER BY s.created_at DESC, s.rowid DESC",
        SELECT_WITH_COUNTS
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Delete a study; guide, interviews and insights cascade
pub async fn delete_study(db: &Pool<Sqlite>, id: &str) -> Result<()> {
    sqlx::query("DELETE FROM studies WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}
