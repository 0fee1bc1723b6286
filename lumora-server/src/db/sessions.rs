//! Login sessions
//!
//! The raw token is returned to the client once; only its SHA-256 is kept.

use chrono::{Duration, Utc};
use lumora_common::api::{generate_session_token, hash_token};
use lumora_common::db::User;
use lumora_common::{Error, Result};
use sqlx::{Pool, Sqlite};
use tracing::debug;

/// Open a session for `user_id` lasting `ttl_seconds`; returns the raw token
pub async fn create_session(db: &Pool<Sqlite>, user_id: &str, ttl_seconds: i64) -> Result<String> {
    let now = Utc::now();
    let expires_at = Duration::try_seconds(ttl_seconds)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| Error::Config(format!("Session timeout out of range: {} seconds", ttl_seconds)))?;
    let token = generate_session_token();

    sqlx::query(
        "INSERT INTO sessions (token_hash, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(hash_token(&token))
    .bind(user_id)
    .bind(now)
    .bind(expires_at)
    .execute(db)
    .await?;

    Ok(token)
}

/// Resolve a raw token to its user
///
/// Expired sessions are deleted and resolve to `None`.
pub async fn find_user_by_token(db: &Pool<Sqlite>, token: &str) -> Result<Option<User>> {
    let token_hash = hash_token(token);

    let row: Option<(String, chrono::DateTime<Utc>)> =
        sqlx::query_as("SELECT user_id, expires_at FROM sessions WHERE token_hash = ?")
            .bind(&token_hash)
            .fetch_optional(db)
            .await?;

    let Some((user_id, expires_at)) = row else {
        return Ok(None);
    };

    if expires_at <= Utc::now() {
        debug!(user_id = %user_id, "Session expired");
        delete_by_hash(db, &token_hash).await?;
        return Ok(None);
    }

    super::users::find_by_id(db, &user_id).await
}

/// End the session identified by a raw token
pub async fn delete_session(db: &Pool<Sqlite>, token: &str) -> Result<()> {
    delete_by_hash(db, &hash_token(token)).await
}

async fn delete_by_hash(db: &Pool<Sqlite>, token_hash: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
        .bind(token_hash)
        .execute(db)
        .await?;
    Ok(())
}
