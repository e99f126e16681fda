//! Campus repository for SQLite operations

use sqlx::{SqliteConnection, SqlitePool};

use crate::data::sqlite::SqliteError;
use crate::data::types::{CampusRow, Upserted};

type CampusTuple = (i64, i64, String, i64);

fn from_tuple((id, university_id, name, created_at): CampusTuple) -> CampusRow {
    CampusRow {
        id,
        university_id,
        name,
        created_at,
    }
}

/// Insert a campus unless `(university_id, name)` already exists
pub async fn ensure_campus(
    conn: &mut SqliteConnection,
    university_id: i64,
    name: &str,
) -> Result<Upserted<CampusRow>, SqliteError> {
    let now = chrono::Utc::now().timestamp();
    let inserted: Option<CampusTuple> = sqlx::query_as(
        r#"
        INSERT INTO campus (university_id, name, created_at) VALUES (?, ?, ?)
        ON CONFLICT(university_id, name) DO NOTHING
        RETURNING id, university_id, name, created_at
        "#,
    )
    .bind(university_id)
    .bind(name)
    .bind(now)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(row) = inserted {
        tracing::debug!(university_id, campus = %name, "Created campus");
        return Ok(Upserted::Created(from_tuple(row)));
    }

    let existing: CampusTuple = sqlx::query_as(
        "SELECT id, university_id, name, created_at FROM campus WHERE university_id = ? AND name = ?",
    )
    .bind(university_id)
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;

    Ok(Upserted::Existing(from_tuple(existing)))
}

pub async fn find_campus(
    pool: &SqlitePool,
    university_id: i64,
    name: &str,
) -> Result<Option<CampusRow>, SqliteError> {
    let row: Option<CampusTuple> = sqlx::query_as(
        "SELECT id, university_id, name, created_at FROM campus WHERE university_id = ? AND name = ?",
    )
    .bind(university_id)
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(from_tuple))
}

pub async fn get_campus(pool: &SqlitePool, id: i64) -> Result<Option<CampusRow>, SqliteError> {
    let row: Option<CampusTuple> =
        sqlx::query_as("SELECT id, university_id, name, created_at FROM campus WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(from_tuple))
}

/// Campuses of a university ordered by name
pub async fn list_campuses(
    pool: &SqlitePool,
    university_id: i64,
) -> Result<Vec<CampusRow>, SqliteError> {
    let rows: Vec<CampusTuple> = sqlx::query_as(
        "SELECT id, university_id, name, created_at FROM campus WHERE university_id = ? ORDER BY name, id",
    )
    .bind(university_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(from_tuple).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::university::ensure_university;
    use crate::data::sqlite::test_pool;

    #[tokio::test]
    async fn test_ensure_campus_and_list_ordering() {
        let pool = test_pool().await;
        let uni_id = {
            let mut conn = pool.acquire().await.unwrap();
            let uni = ensure_university(&mut conn, "University of Southern Maine", "ME", None)
                .await
                .unwrap()
                .into_inner();

            for name in ["Portland", "Gorham", "Lewiston-Auburn", "Gorham"] {
                ensure_campus(&mut conn, uni.id, name).await.unwrap();
            }
            uni.id
        };

        let names: Vec<String> = list_campuses(&pool, uni_id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Gorham", "Lewiston-Auburn", "Portland"]);

        let gorham = find_campus(&pool, uni_id, "Gorham").await.unwrap().unwrap();
        let by_id = get_campus(&pool, gorham.id).await.unwrap().unwrap();
        assert_eq!(by_id.name, "Gorham");
        assert!(find_campus(&pool, uni_id, "Bangor").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_campus_requires_university() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let err = ensure_campus(&mut conn, 999, "Nowhere").await.unwrap_err();
        match err {
            SqliteError::Database(e) => {
                assert!(crate::data::sqlite::is_foreign_key_violation(&e))
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
