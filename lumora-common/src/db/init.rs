//! Database initialization
//!
//! Opens (or creates) the SQLite database, creates every table idempotently,
//! runs versioned migrations and seeds default settings plus the synthetic
//! AI reviewer account.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::{info, warn};

/// Fixed id of the synthetic account that authors AI reviews
pub const AI_REVIEWER_ID: &str = "ai-reviewer";

/// Email of the synthetic AI reviewer account
pub const AI_REVIEWER_EMAIL: &str = "ai-reviewer@lumora.app";

/// Display name of the synthetic AI reviewer account
pub const AI_REVIEWER_NAME: &str = "AI Reviewer";

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys (cascading deletes depend on it)
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    // WAL allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    // Table creation (idempotent - safe to call multiple times)
    create_schema_version_table(&pool).await?;
    create_settings_table(&pool).await?;
    create_users_table(&pool).await?;
    create_sessions_table(&pool).await?;

    // App-review marketplace
    create_apps_table(&pool).await?;
    create_reviews_table(&pool).await?;
    create_review_votes_table(&pool).await?;

    // Customer research platform
    create_studies_table(&pool).await?;
    create_discussion_guides_table(&pool).await?;
    create_interviews_table(&pool).await?;
    create_insights_table(&pool).await?;

    // Record the schema version and apply any pending upgrades
    crate::db::migrations::run_migrations(&pool).await?;

    init_default_settings(&pool).await?;
    ensure_ai_reviewer(&pool).await?;

    Ok(pool)
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the settings table
///
/// Stores application configuration key-value pairs.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL DEFAULT '',
            role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin')),
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token_hash TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TIMESTAMP NOT NULL,
            expires_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the apps table
///
/// `questions` and `screenshots` are JSON arrays of strings.
pub async fn create_apps_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS apps (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            url TEXT,
            target_audience TEXT,
            questions TEXT NOT NULL DEFAULT '[]',
            screenshots TEXT NOT NULL DEFAULT '[]',
            status TEXT NOT NULL DEFAULT 'draft' CHECK (status IN ('draft', 'published', 'archived')),
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_apps_user_id ON apps(user_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_apps_status ON apps(status)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the reviews table
///
/// One review per (app, reviewer); the AI reviewer is an ordinary user row.
pub async fn create_reviews_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            id TEXT PRIMARY KEY,
            is_ai INTEGER NOT NULL DEFAULT 0,
            ratings TEXT NOT NULL DEFAULT '{}',
            overall_score REAL NOT NULL DEFAULT 0,
            feedback TEXT NOT NULL,
            suggestions TEXT NOT NULL DEFAULT '[]',
            owner_response TEXT,
            owner_responded_at TIMESTAMP,
            app_id TEXT NOT NULL REFERENCES apps(id) ON DELETE CASCADE,
            reviewer_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL,
            UNIQUE (app_id, reviewer_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reviews_reviewer_id ON reviews(reviewer_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_review_votes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS review_votes (
            id TEXT PRIMARY KEY,
            review_id TEXT NOT NULL REFERENCES reviews(id) ON DELETE CASCADE,
            voter_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            helpful INTEGER NOT NULL,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL,
            UNIQUE (review_id, voter_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the studies table
pub async fn create_studies_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS studies (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            goal TEXT NOT NULL,
            target_audience TEXT NOT NULL,
            study_type TEXT NOT NULL CHECK (study_type IN ('exploratory', 'concept_test', 'usability_test', 'journey_map')),
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_studies_user_id ON studies(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_discussion_guides_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS discussion_guides (
            id TEXT PRIMARY KEY,
            study_id TEXT NOT NULL UNIQUE REFERENCES studies(id) ON DELETE CASCADE,
            sections TEXT NOT NULL DEFAULT '[]',
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the interviews table
///
/// `messages` holds the full transcript as a JSON array.
pub async fn create_interviews_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS interviews (
            id TEXT PRIMARY KEY,
            study_id TEXT NOT NULL REFERENCES studies(id) ON DELETE CASCADE,
            participant_name TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'scheduled' CHECK (status IN ('scheduled', 'in_progress', 'completed')),
            messages TEXT NOT NULL DEFAULT '[]',
            started_at TIMESTAMP,
            completed_at TIMESTAMP,
            created_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_interviews_study_id ON interviews(study_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_insights_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS insights (
            id TEXT PRIMARY KEY,
            study_id TEXT NOT NULL REFERENCES studies(id) ON DELETE CASCADE,
            summary TEXT NOT NULL,
            themes TEXT NOT NULL DEFAULT '[]',
            recommendations TEXT NOT NULL DEFAULT '[]',
            generated_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_insights_study_id ON insights(study_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Initialize or update default settings
///
/// This function ensures all required settings exist with default values.
/// It also handles NULL values by resetting them to defaults.
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    // AI provider
    ensure_setting(pool, "ai_model", "gpt-4o-mini").await?;

    // Session and authentication settings
    ensure_setting(pool, "session_timeout_seconds", "2592000").await?; // 30 days
    ensure_setting(pool, "min_password_length", "6").await?;

    // Research interviews
    ensure_setting(pool, "interview_questions_per_section", "3").await?;

    // URL analysis
    ensure_setting(pool, "site_fetch_timeout_ms", "10000").await?;
    ensure_setting(pool, "site_content_max_chars", "4000").await?;

    info!("Default settings initialized");
    Ok(())
}

/// Ensure a setting exists with the specified default value
///
/// If the setting doesn't exist, it will be created with the default.
/// If the setting exists but has a NULL value, it will be reset to the default.
async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    match value {
        None => {
            // INSERT OR IGNORE tolerates two processes initializing at once
            sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
                .bind(key)
                .bind(default_value)
                .execute(pool)
                .await?;

            info!("Initialized setting '{}' with default value: {}", key, default_value);
        }
        Some(None) => {
            sqlx::query("UPDATE settings SET value = ? WHERE key = ?")
                .bind(default_value)
                .bind(key)
                .execute(pool)
                .await?;

            warn!("Setting '{}' was NULL, reset to default: {}", key, default_value);
        }
        Some(Some(_)) => {}
    }

    Ok(())
}

/// Create the synthetic AI reviewer account if it doesn't exist
///
/// The account has no password, so it can never log in.
pub async fn ensure_ai_reviewer(pool: &SqlitePool) -> Result<()> {
    let now = chrono::Utc::now();

    sqlx::query(
        r#"
        INSERT OR IGNORE INTO users (id, name, email, password_hash, role, created_at, updated_at)
        VALUES (?, ?, ?, '', 'admin', ?, ?)
        "#,
    )
    .bind(AI_REVIEWER_ID)
    .bind(AI_REVIEWER_NAME)
    .bind(AI_REVIEWER_EMAIL)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}
