//! Review queries and per-app review statistics

use chrono::{DateTime, Utc};
use lumora_common::db::{Review, AI_REVIEWER_ID};
use lumora_common::scoring::{average, overall_score, Ratings};
use lumora_common::{Error, Result};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::{Pool, Sqlite};
use std::collections::HashMap;
use uuid::Uuid;

/// Review content as authored
#[derive(Debug, Clone, Default)]
pub struct NewReview {
    pub is_ai: bool,
    pub ratings: Ratings,
    pub feedback: String,
    pub suggestions: Vec<String>,
}

/// Review joined with its author and app names
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewDetail {
    #[sqlx(flatten)]
    pub review: Review,
    pub reviewer_name: String,
    pub reviewer_email: String,
    pub app_name: String,
}

/// Aggregate numbers shown on app cards and detail pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub review_count: usize,
    pub ai_review_count: usize,
    pub human_review_count: usize,
    pub average_score: f64,
}

impl ReviewStats {
    fn from_scores(scores: &[(bool, f64)]) -> Self {
        let ai = scores.iter().filter(|(is_ai, _)| *is_ai).count();
        Self {
            review_count: scores.len(),
            ai_review_count: ai,
            human_review_count: scores.len() - ai,
            average_score: average(scores.iter().map(|(_, score)| *score)),
        }
    }
}

const SELECT_DETAIL: &str = r#"
    SELECT r.*, u.name AS reviewer_name, u.email AS reviewer_email, a.name AS app_name
    FROM reviews r
    JOIN users u ON u.id = r.reviewer_id
    JOIN apps a ON a.id = r.app_id
"#;

/// Store a review; `overall_score` is derived from the ratings
///
/// Fails with [`Error::Conflict`] when `reviewer_id` already reviewed the app.
pub async fn create_review(
    db: &Pool<Sqlite>,
    app_id: &str,
    reviewer_id: &str,
    new_review: NewReview,
) -> Result<Review> {
    let now = Utc::now();
    let review = Review {
        id: Uuid::new_v4().to_string(),
        is_ai: new_review.is_ai,
        overall_score: overall_score(&new_review.ratings),
        ratings: Json(new_review.ratings),
        feedback: new_review.feedback,
        suggestions: Json(new_review.suggestions),
        owner_response: None,
        owner_responded_at: None,
        app_id: app_id.to_string(),
        reviewer_id: reviewer_id.to_string(),
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO reviews (id, is_ai, ratings, overall_score, feedback, suggestions, app_id, reviewer_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&review.id)
    .bind(review.is_ai)
    .bind(&review.ratings)
    .bind(review.overall_score)
    .bind(&review.feedback)
    .bind(&review.suggestions)
    .bind(&review.app_id)
    .bind(&review.reviewer_id)
    .bind(review.created_at)
    .bind(review.updated_at)
    .execute(db)
    .await
    .map_err(|e| Error::from_unique_violation(e, "You have already reviewed this app"))?;

    Ok(review)
}

pub async fn get_review(db: &Pool<Sqlite>, id: &str) -> Result<Option<Review>> {
    let review = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(review)
}

/// Fetch a review only if it belongs to `app_id`
pub async fn get_review_for_app(db: &Pool<Sqlite>, app_id: &str, review_id: &str) -> Result<Option<Review>> {
    Ok(get_review(db, review_id)
        .await?
        .filter(|review| review.app_id == app_id))
}

pub async fn has_reviewed(db: &Pool<Sqlite>, app_id: &str, reviewer_id: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM reviews WHERE app_id = ? AND reviewer_id = ?)",
    )
    .bind(app_id)
    .bind(reviewer_id)
    .fetch_one(db)
    .await?;
    Ok(exists)
}

pub async fn has_ai_review(db: &Pool<Sqlite>, app_id: &str) -> Result<bool> {
    has_reviewed(db, app_id, AI_REVIEWER_ID).await
}

/// Reviews of one app, newest first
pub async fn list_for_app(db: &Pool<Sqlite>, app_id: &str) -> Result<Vec<ReviewDetail>> {
    let rows = sqlx::query_as::<_, ReviewDetail>(&format!(
        "{} WHERE r.app_id = ? ORDER BY r.created_at DESC, r.rowid DESC",
        SELECT_DETAIL
    ))
    .bind(app_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Reviews written by `reviewer_id`, newest first
pub async fn list_by_reviewer(db: &Pool<Sqlite>, reviewer_id: &str) -> Result<Vec<ReviewDetail>> {
    let rows = sqlx::query_as::<_, ReviewDetail>(&format!(
        "{} WHERE r.reviewer_id = ? ORDER BY r.created_at DESC, r.rowid DESC",
        SELECT_DETAIL
    ))
    .bind(reviewer_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Reviews received on apps owned by `owner_id`, newest first
pub async fn list_received(db: &Pool<Sqlite>, owner_id: &str, limit: i64) -> Result<Vec<ReviewDetail>> {
    let rows = sqlx::query_as::<_, ReviewDetail>(&format!(
        "{} WHERE a.user_id = ? ORDER BY r.created_at DESC, r.rowid DESC LIMIT ?",
        SELECT_DETAIL
    ))
    .bind(owner_id)
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Overall scores of reviews received on apps owned by `owner_id`
pub async fn received_scores(db: &Pool<Sqlite>, owner_id: &str) -> Result<Vec<f64>> {
    let scores = sqlx::query_scalar(
        "SELECT r.overall_score FROM reviews r JOIN apps a ON a.id = r.app_id WHERE a.user_id = ?",
    )
    .bind(owner_id)
    .fetch_all(db)
    .await?;
    Ok(scores)
}

pub async fn count_by_reviewer(db: &Pool<Sqlite>, reviewer_id: &str) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE reviewer_id = ?")
        .bind(reviewer_id)
        .fetch_one(db)
        .await?;
    Ok(count)
}

/// Statistics for one app
pub async fn stats_for_app(db: &Pool<Sqlite>, app_id: &str) -> Result<ReviewStats> {
    let scores: Vec<(bool, f64)> =
        sqlx::query_as("SELECT is_ai, overall_score FROM reviews WHERE app_id = ?")
            .bind(app_id)
            .fetch_all(db)
            .await?;
    Ok(ReviewStats::from_scores(&scores))
}

/// Statistics for every app that has at least one review
pub async fn stats_by_app(db: &Pool<Sqlite>) -> Result<HashMap<String, ReviewStats>> {
    let rows: Vec<(String, bool, f64)> =
        sqlx::query_as("SELECT app_id, is_ai, overall_score FROM reviews")
            .fetch_all(db)
            .await?;

    let mut grouped: HashMap<String, Vec<(bool, f64)>> = HashMap::new();
    for (app_id, is_ai, score) in rows {
        grouped.entry(app_id).or_default().push((is_ai, score));
    }

    Ok(grouped
        .into_iter()
        .map(|(app_id, scores)| (app_id, ReviewStats::from_scores(&scores)))
        .collect())
}

/// `(is_ai, ratings)` of every review of an app, for summaries
pub async fn ratings_for_app(db: &Pool<Sqlite>, app_id: &str) -> Result<Vec<(bool, Ratings)>> {
    let rows: Vec<(bool, Json<Ratings>)> =
        sqlx::query_as("SELECT is_ai, ratings FROM reviews WHERE app_id = ?")
            .bind(app_id)
            .fetch_all(db)
            .await?;
    Ok(rows.into_iter().map(|(is_ai, ratings)| (is_ai, ratings.0)).collect())
}

pub async fn delete_review(db: &Pool<Sqlite>, id: &str) -> Result<()> {
    sqlx::query("DELETE FROM reviews WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

/// Record the app owner's reply to a review
pub async fn set_owner_response(
    db: &Pool<Sqlite>,
    id: &str,
    response: &str,
) -> Result<DateTime<Utc>> {
    let now = Utc::now();
    sqlx::query(
        "UPDATE reviews SET owner_response = ?, owner_responded_at = ?, updated_at = ? WHERE id = ?",
    )
    .bind(response)
    .bind(now)
    .bind(now)
    .bind(id)
    .execute(db)
    .await?;
    Ok(now)
}
