//! Synthesized insight queries

use chrono::Utc;
use lumora_common::db::{Insight, Theme};
use lumora_common::Result;
use sqlx::types::Json;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

/// Store a new synthesis run; earlier runs are kept
pub async fn create_insight(
    db: &Pool<Sqlite>,
    study_id: &str,
    summary: String,
    themes: Vec<Theme>,
    recommendations: Vec<String>,
) -> Result<Insight> {
    let insight = Insight {
        id: Uuid::new_v4().to_string(),
        study_id: study_id.to_string(),
        summary,
        themes: Json(themes),
        recommendations: Json(recommendations),
        generated_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO insights (id, study_id, summary, themes, recommendations, generated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&insight.id)
    .bind(&insight.study_id)
    .bind(&insight.summary)
    .bind(&insight.themes)
    .bind(&insight.recommendations)
    .bind(insight.generated_at)
    .execute(db)
    .await?;

    Ok(insight)
}

/// Most recent synthesis for a study
pub async fn latest_for_study(db: &Pool<Sqlite>, study_id: &str) -> Result<Option<Insight>> {
    let insight = sqlx::query_as::<_, Insight>(
        "SELECT * FROM insights WHERE study_id = ? ORDER BY generated_at DESC, rowid DESC LIMIT 1",
    )
    .bind(study_id)
    .fetch_optional(db)
    .await?;
    Ok(insight)
}
