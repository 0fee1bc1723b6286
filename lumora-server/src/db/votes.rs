//! Helpfulness votes on reviews

use chrono::Utc;
use lumora_common::db::ReviewVote;
use lumora_common::Result;
use serde::Serialize;
use sqlx::{Pool, Sqlite};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VoteCounts {
    pub helpful: i64,
    pub unhelpful: i64,
}

/// Record or replace `voter_id`'s vote on a review
pub async fn upsert_vote(
    db: &Pool<Sqlite>,
    review_id: &str,
    voter_id: &str,
    helpful: bool,
) -> Result<ReviewVote> {
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO review_votes (id, review_id, voter_id, helpful, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(review_id, voter_id) DO UPDATE
        SET helpful = excluded.helpful, updated_at = excluded.updated_at
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(review_id)
    .bind(voter_id)
    .bind(helpful)
    .bind(now)
    .bind(now)
    .execute(db)
    .await?;

    let vote = sqlx::query_as::<_, ReviewVote>(
        "SELECT * FROM review_votes WHERE review_id = ? AND voter_id = ?",
    )
    .bind(review_id)
    .bind(voter_id)
    .fetch_one(db)
    .await?;

    Ok(vote)
}

pub async fn counts_for_review(db: &Pool<Sqlite>, review_id: &str) -> Result<VoteCounts> {
    let (helpful, total): (i64, i64) = sqlx::query_as(
        "SELECT COALESCE(SUM(helpful), 0), COUNT(*) FROM review_votes WHERE review_id = ?",
    )
    .bind(review_id)
    .fetch_one(db)
    .await?;

    Ok(VoteCounts {
        helpful,
        unhelpful: total - helpful,
    })
}

/// Vote counts keyed by review id for every review of an app
pub async fn counts_for_app(db: &Pool<Sqlite>, app_id: &str) -> Result<HashMap<String, VoteCounts>> {
    let rows: Vec<(String, i64, i64)> = sqlx::query_as(
        r#"
        SELECT v.review_id, COALESCE(SUM(v.helpful), 0), COUNT(*)
        FROM review_votes v
        JOIN reviews r ON r.id = v.review_id
        WHERE r.app_id = ?
        GROUP BY v.review_id
        "#,
    )
    .bind(app_id)
    .fetch_all(db)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(review_id, helpful, total)| {
            (
                review_id,
                VoteCounts {
                    helpful,
                    unhelpful: total - helpful,
                },
            )
        })
        .collect())
}
