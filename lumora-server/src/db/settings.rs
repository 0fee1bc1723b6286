//! Settings database operations
//!
//! Provides get/set accessors for the settings table following the
//! key-value pattern. Typed getters fall back to the same defaults that
//! database initialization seeds.

use lumora_common::{Error, Result};
use sqlx::{Pool, Sqlite};

/// Settings key holding the chat model API key
pub const OPENAI_API_KEY: &str = "openai_api_key";

pub async fn get_openai_api_key(db: &Pool<Sqlite>) -> Result<Option<String>> {
    get_setting::<String>(db, OPENAI_API_KEY).await
}

pub async fn set_openai_api_key(db: &Pool<Sqlite>, key: String) -> Result<()> {
    set_setting(db, OPENAI_API_KEY, key).await
}

/// Chat model name
///
/// **Default:** gpt-4o-mini
pub async fn get_ai_model(db: &Pool<Sqlite>) -> Result<String> {
    get_setting(db, "ai_model")
        .await
        .map(|opt| opt.unwrap_or_else(|| "gpt-4o-mini".to_string()))
}

/// Session lifetime in seconds
///
/// **Default:** 2592000 (30 days)
pub async fn get_session_timeout_seconds(db: &Pool<Sqlite>) -> Result<i64> {
    get_setting(db, "session_timeout_seconds").await.map(|opt| opt.unwrap_or(2_592_000))
}

/// **Default:** 6
pub async fn get_min_password_length(db: &Pool<Sqlite>) -> Result<usize> {
    get_setting(db, "min_password_length").await.map(|opt| opt.unwrap_or(6))
}

/// Interviewer turns assumed per guide section when estimating progress
///
/// **Default:** 3
pub async fn get_interview_questions_per_section(db: &Pool<Sqlite>) -> Result<usize> {
    get_setting(db, "interview_questions_per_section").await.map(|opt| opt.unwrap_or(3))
}

/// Timeout for fetching submitted websites
///
/// **Default:** 10000 ms
pub async fn get_site_fetch_timeout_ms(db: &Pool<Sqlite>) -> Result<u64> {
    get_setting(db, "site_fetch_timeout_ms").await.map(|opt| opt.unwrap_or(10_000))
}

/// Maximum page text handed to the model
///
/// **Default:** 4000 characters
pub async fn get_site_content_max_chars(db: &Pool<Sqlite>) -> Result<usize> {
    get_setting(db, "site_content_max_chars").await.map(|opt| opt.unwrap_or(4000))
}

/// Generic setting getter
///
/// Missing rows and NULL values both read as `None`.
pub async fn get_setting<T>(db: &Pool<Sqlite>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let row: Option<(Option<String>,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await
        .map_err(Error::Database)?;

    match row.and_then(|(value,)| value) {
        Some(value) => {
            let parsed = value
                .parse::<T>()
                .map_err(|e| Error::Config(format!("Parse setting '{}' failed: {}", key, e)))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

/// Generic setting setter (upsert)
pub async fn set_setting<T>(db: &Pool<Sqlite>, key: &str, value: T) -> Result<()>
where
    T: std::fmt::Display,
{
    sqlx::query(
        "INSERT INTO settings (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
    )
    .bind(key)
    .bind(value.to_string())
    .execute(db)
    .await
    .map_err(Error::Database)?;

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
