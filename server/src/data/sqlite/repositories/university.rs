//! University repository for SQLite operations

use sqlx::{SqliteConnection, SqlitePool};

use crate::data::sqlite::{SqliteError, begin_write};
use crate::data::types::{UniversityRow, UniversitySummary, Upserted};
use crate::utils::sql::contains_pattern;

type UniversityTuple = (i64, String, String, Option<String>, i64);

fn from_tuple((id, name, state, wiki_url, created_at): UniversityTuple) -> UniversityRow {
    UniversityRow {
        id,
        name,
        state,
        wiki_url,
        created_at,
    }
}

/// Get a university by its (name, state) natural key
pub async fn find_university(
    pool: &SqlitePool,
    name: &str,
    state: &str,
) -> Result<Option<UniversityRow>, SqliteError> {
    let row: Option<UniversityTuple> = sqlx::query_as(
        "SELECT id, name, state, wiki_url, created_at FROM university WHERE name = ? AND state = ?",
    )
    .bind(name)
    .bind(state)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(from_tuple))
}

/// Universities with the given name, optionally narrowed by state
///
/// More than one row means the name alone is ambiguous.
pub async fn find_by_name(
    pool: &SqlitePool,
    name: &str,
    state: Option<&str>,
) -> Result<Vec<UniversityRow>, SqliteError> {
    let rows: Vec<UniversityTuple> = sqlx::query_as(
        r#"
        SELECT id, name, state, wiki_url, created_at FROM university
        WHERE name = ? AND (? IS NULL OR state = ?)
        ORDER BY state, id
        "#,
    )
    .bind(name)
    .bind(state)
    .bind(state)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(from_tuple).collect())
}

pub async fn get_university(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<UniversityRow>, SqliteError> {
    let row: Option<UniversityTuple> = sqlx::query_as(
        "SELECT id, name, state, wiki_url, created_at FROM university WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(from_tuple))
}

pub async fn list_universities(pool: &SqlitePool) -> Result<Vec<UniversityRow>, SqliteError> {
    let rows: Vec<UniversityTuple> = sqlx::query_as(
        "SELECT id, name, state, wiki_url, created_at FROM university ORDER BY name, state",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(from_tuple).collect())
}

/// Search universities by name substring and exact state, with campus counts
pub async fn search_universities(
    pool: &SqlitePool,
    q: Option<&str>,
    state: Option<&str>,
    limit: i64,
) -> Result<Vec<UniversitySummary>, SqliteError> {
    let pattern = q.map(contains_pattern);

    let rows: Vec<(i64, String, String, Option<String>, i64)> = sqlx::query_as(
        r#"
        SELECT u.id, u.name, u.state, u.wiki_url, COUNT(c.id) AS campus_count
        FROM university u
        LEFT JOIN campus c ON c.university_id = u.id
        WHERE (? IS NULL OR u.name LIKE ? ESCAPE '\')
          AND (? IS NULL OR u.state = ?)
        GROUP BY u.id
        ORDER BY u.name, u.state
        LIMIT ?
        "#,
    )
    .bind(&pattern)
    .bind(&pattern)
    .bind(state)
    .bind(state)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name, state, wiki_url, campus_count)| UniversitySummary {
            id,
            name,
            state,
            wiki_url,
            campus_count,
        })
        .collect())
}

/// Insert a university unless `(name, state)` already exists
pub async fn ensure_university(
    conn: &mut SqliteConnection,
    name: &str,
    state: &str,
    wiki_url: Option<&str>,
) -> Result<Upserted<UniversityRow>, SqliteError> {
    let now = chrono::Utc::now().timestamp();
    let inserted: Option<UniversityTuple> = sqlx::query_as(
        r#"
        INSERT INTO university (name, state, wiki_url, created_at) VALUES (?, ?, ?, ?)
        ON CONFLICT(name, state) DO NOTHING
        RETURNING id, name, state, wiki_url, created_at
        "#,
    )
    .bind(name)
    .bind(state)
    .bind(wiki_url)
    .bind(now)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(row) = inserted {
        return Ok(Upserted::Created(from_tuple(row)));
    }

    let existing: UniversityTuple = sqlx::query_as(
        "SELECT id, name, state, wiki_url, created_at FROM university WHERE name = ? AND state = ?",
    )
    .bind(name)
    .bind(state)
    .fetch_one(&mut *conn)
    .await?;

    Ok(Upserted::Existing(from_tuple(existing)))
}

/// Delete a university that no campus references
///
/// Returns `Ok(false)` if the university does not exist and
/// `SqliteError::Conflict` while campuses still reference it.
pub async fn delete_university(pool: &SqlitePool, id: i64) -> Result<bool, SqliteError> {
    let mut tx = begin_write(pool).await?;

    let exists: bool = sqlx::query_scalar("SELECT COUNT(*) > 0 FROM university WHERE id = ?")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    if !exists {
        return Ok(false);
    }

    let campuses: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM campus WHERE university_id = ?")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    if campuses > 0 {
        return Err(SqliteError::Conflict(format!(
            "university {} still has {} campus(es)",
            id, campuses
        )));
    }

    sqlx::query("DELETE FROM university WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}
