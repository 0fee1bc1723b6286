//! User account queries

use chrono::Utc;
use lumora_common::db::{User, UserRole};
use lumora_common::{Error, Result};
use serde::Serialize;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

const EMAIL_IN_USE: &str = "Email is already in use";

/// Public identity shown next to apps and reviews
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct UserSummary {
    pub name: String,
    pub email: String,
}

/// Insert a new user with role `user`
///
/// Fails with [`Error::Conflict`] when the email is taken.
pub async fn create_user(
    db: &Pool<Sqlite>,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<User> {
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        role: UserRole::User,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(db)
    .await
    .map_err(|e| Error::from_unique_violation(e, EMAIL_IN_USE))?;

    Ok(user)
}

pub async fn find_by_id(db: &Pool<Sqlite>, id: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(user)
}

/// Look up a user by (already normalized) email
pub async fn find_by_email(db: &Pool<Sqlite>, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(db)
        .await?;
    Ok(user)
}

/// Change name and email
///
/// Returns the updated row, or [`Error::Conflict`] if the email belongs to
/// another account.
pub async fn update_profile(db: &Pool<Sqlite>, id: &str, name: &str, email: &str) -> Result<User> {
    let result = sqlx::query("UPDATE users SET name = ?, email = ?, updated_at = ? WHERE id = ?")
        .bind(name)
        .bind(email)
        .bind(Utc::now())
        .bind(id)
        .execute(db)
        .await
        .map_err(|e| Error::from_unique_violation(e, EMAIL_IN_USE))?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("User not found".to_string()));
    }

    find_by_id(db, id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))
}

pub async fn update_password(db: &Pool<Sqlite>, id: &str, password_hash: &str) -> Result<()> {
    sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .execute(db)
        .await?;

    Ok(())
}
