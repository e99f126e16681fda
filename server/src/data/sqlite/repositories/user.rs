//! User repository for SQLite operations
//!
//! Usernames compare case-insensitively (`COLLATE NOCASE` on the column).

use sqlx::SqlitePool;

use crate::data::sqlite::{SqliteError, is_unique_violation};
use crate::data::types::{UserRole, UserRow, Upserted};

type UserTuple = (i64, String, String, String, Option<i64>, i64);

fn from_tuple(
    (id, username, password_hash, role, university_id, created_at): UserTuple,
) -> Result<UserRow, SqliteError> {
    Ok(UserRow {
        id,
        username,
        password_hash,
        role: role.parse()?,
        university_id,
        created_at,
    })
}

/// Create a user; a taken username yields `SqliteError::Conflict`
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
    role: UserRole,
    university_id: Option<i64>,
) -> Result<UserRow, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query(
        "INSERT INTO users (username, password_hash, role, university_id, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(username)
    .bind(password_hash)
    .bind(role.as_str())
    .bind(university_id)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            SqliteError::Conflict(format!("username '{}' is taken", username))
        } else {
            SqliteError::Database(e)
        }
    })?;

    Ok(UserRow {
        id: result.last_insert_rowid(),
        username: username.to_string(),
        password_hash: password_hash.to_string(),
        role,
        university_id,
        created_at: now,
    })
}

pub async fn get_user(pool: &SqlitePool, id: i64) -> Result<Option<UserRow>, SqliteError> {
    let row: Option<UserTuple> = sqlx::query_as(
        "SELECT id, username, password_hash, role, university_id, created_at FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(from_tuple).transpose()
}

pub async fn get_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<UserRow>, SqliteError> {
    let row: Option<UserTuple> = sqlx::query_as(
        "SELECT id, username, password_hash, role, university_id, created_at FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    row.map(from_tuple).transpose()
}

pub async fn list_users(pool: &SqlitePool) -> Result<Vec<UserRow>, SqliteError> {
    let rows: Vec<UserTuple> = sqlx::query_as(
        "SELECT id, username, password_hash, role, university_id, created_at FROM users ORDER BY username",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(from_tuple).collect()
}

/// Change a user's role; `None` if the user does not exist
pub async fn set_role(
    pool: &SqlitePool,
    username: &str,
    role: UserRole,
) -> Result<Option<UserRow>, SqliteError> {
    let result = sqlx::query("UPDATE users SET role = ? WHERE username = ?")
        .bind(role.as_str())
        .bind(username)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    tracing::debug!(%username, role = role.as_str(), "Updated user role");
    get_by_username(pool, username).await
}

/// Create an admin, or promote an existing user and reset their password
pub async fn upsert_admin(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
) -> Result<Upserted<UserRow>, SqliteError> {
    let result = sqlx::query("UPDATE users SET role = 'admin', password_hash = ? WHERE username = ?")
        .bind(password_hash)
        .bind(username)
        .execute(pool)
        .await?;

    if result.rows_affected() > 0 {
        return match get_by_username(pool, username).await? {
            Some(user) => Ok(Upserted::Existing(user)),
            None => Err(SqliteError::NotFound(format!("user '{}'", username))),
        };
    }

    create_user(pool, username, password_hash, UserRole::Admin, None)
        .await
        .map(Upserted::Created)
}
