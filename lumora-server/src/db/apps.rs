//! Marketplace app queries

use chrono::Utc;
use lumora_common::db::{App, AppStatus};
use lumora_common::Result;
use sqlx::types::Json;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

/// Fields supplied when an app is submitted
#[derive(Debug, Clone, Default)]
pub struct NewApp {
    pub name: String,
    pub description: String,
    pub url: Option<String>,
    pub target_audience: Option<String>,
    pub questions: Vec<String>,
    pub screenshots: Vec<String>,
}

/// App joined with its owner's public identity
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AppWithOwner {
    #[sqlx(flatten)]
    pub app: App,
    pub owner_name: String,
    pub owner_email: String,
}

const SELECT_WITH_OWNER: &str = r#"
    SELECT a.*, u.name AS owner_name, u.email AS owner_email
    FROM apps a
    JOIN users u ON u.id = a.user_id
"#;

/// Insert a new `draft` app owned by `user_id`
pub async fn create_app(db: &Pool<Sqlite>, user_id: &str, new_app: NewApp) -> Result<App> {
    let now = Utc::now();
    let app = App {
        id: Uuid::new_v4().to_string(),
        name: new_app.name,
        description: new_app.description,
        url: new_app.url,
        target_audience: new_app.target_audience,
        questions: Json(new_app.questions),
        screenshots: Json(new_app.screenshots),
        status: AppStatus::Draft,
        user_id: user_id.to_string(),
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO apps (id, name, description, url, target_audience, questions, screenshots, status, user_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&app.id)
    .bind(&app.name)
    .bind(&app.description)
    .bind(&app.url)
    .bind(&app.target_audience)
    .bind(&app.questions)
    .bind(&app.screenshots)
    .bind(app.status)
    .bind(&app.user_id)
    .bind(app.created_at)
    .bind(app.updated_at)
    .execute(db)
    .await?;

    Ok(app)
}

pub async fn get_app(db: &Pool<Sqlite>, id: &str) -> Result<Option<App>> {
    let app = sqlx::query_as::<_, App>("SELECT * FROM apps WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(app)
}

pub async fn get_app_with_owner(db: &Pool<Sqlite>, id: &str) -> Result<Option<AppWithOwner>> {
    let row = sqlx::query_as::<_, AppWithOwner>(&format!("{} WHERE a.id = ?", SELECT_WITH_OWNER))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

/// Published apps, newest first
pub async fn list_published(db: &Pool<Sqlite>) -> Result<Vec<AppWithOwner>> {
    let rows = sqlx::query_as::<_, AppWithOwner>(&format!(
        "{} WHERE a.status = ? ORDER BY a.created_at DESC, a.rowid DESC",
        SELECT_WITH_OWNER
    ))
    .bind(AppStatus::Published)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Every app owned by `user_id` regardless of status, newest first
pub async fn list_by_owner(db: &Pool<Sqlite>, user_id: &str) -> Result<Vec<AppWithOwner>> {
    let rows = sqlx::query_as::<_, AppWithOwner>(&format!(
        "{} WHERE a.user_id = ? ORDER BY a.created_at DESC, a.rowid DESC",
        SELECT_WITH_OWNER
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn count_by_owner(db: &Pool<Sqlite>, user_id: &str) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM apps WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(db)
        .await?;
    Ok(count)
}

/// Persist every mutable column of `app` and bump `updated_at`
pub async fn update_app(db: &Pool<Sqlite>, mut app: App) -> Result<App> {
    app.updated_at = Utc::now();

    sqlx::query(
        r#"
        UPDATE apps
        SET name = ?, description = ?, url = ?, target_audience = ?, questions = ?,
            screenshots = ?, status = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&app.name)
    .bind(&app.description)
    .bind(&app.url)
    .bind(&app.target_audience)
    .bind(&app.questions)
    .bind(&app.screenshots)
    .bind(app.status)
    .bind(app.updated_at)
    .bind(&app.id)
    .execute(db)
    .await?;

    Ok(app)
}

/// Delete an app; reviews and their votes cascade
pub async fn delete_app(db: &Pool<Sqlite>, id: &str) -> Result<()> {
    sqlx::query("DELETE FROM apps WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}
