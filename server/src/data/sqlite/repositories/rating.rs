//! Rating repository for SQLite operations
//!
//! A rating and its tag rows are written in one transaction. Reads fold the
//! tag tables with `GROUP_CONCAT` and split them back into lists.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::decode_enum;
use crate::data::sqlite::{SqliteError, begin_write};
use crate::data::types::{NewRating, RatingRow, RatingSummary, ReviewFilter};

const RATING_SELECT: &str = r#"
    SELECT rt.id, rt.user_id, u.username, u.role, rt.location_id,
           l.name AS location_name, l.kind AS location_kind,
           b.name AS building_name, rm.room_number,
           c.name AS campus_name, un.name AS university_name,
           rt.score, rt.noise, rt.cleanliness, rt.equipment_quality, rt.wifi_strength,
           rt.comment, rt.created_at,
           (SELECT GROUP_CONCAT(tag, ',') FROM rating_equipment WHERE rating_id = rt.id) AS equipment_tags,
           (SELECT GROUP_CONCAT(tag, ',') FROM rating_accessibility WHERE rating_id = rt.id) AS accessibility_tags
    FROM ratings rt
    JOIN users u ON u.id = rt.user_id
    JOIN location l ON l.id = rt.location_id
    JOIN campus c ON c.id = l.campus_id
    JOIN university un ON un.id = l.university_id
    LEFT JOIN rooms rm ON rm.location_id = l.id
    LEFT JOIN location b ON b.id = rm.building_id
"#;

/// Split a `GROUP_CONCAT` result back into a sorted list
fn split_tags(joined: Option<String>) -> Vec<String> {
    let mut tags: Vec<String> = joined
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect();
    tags.sort();
    tags
}

fn rating_from_row(row: &SqliteRow) -> Result<RatingRow, SqliteError> {
    Ok(RatingRow {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        username: row.try_get("username")?,
        role: decode_enum(row, "role")?,
        location_id: row.try_get("location_id")?,
        location_name: row.try_get("location_name")?,
        location_kind: decode_enum(row, "location_kind")?,
        building_name: row.try_get("building_name")?,
        room_number: row.try_get("room_number")?,
        campus_name: row.try_get("campus_name")?,
        university_name: row.try_get("university_name")?,
        score: row.try_get("score")?,
        noise: row.try_get("noise")?,
        cleanliness: row.try_get("cleanliness")?,
        equipment_quality: row.try_get("equipment_quality")?,
        wifi_strength: row.try_get("wifi_strength")?,
        comment: row.try_get("comment")?,
        created_at: row.try_get("created_at")?,
        equipment_tags: split_tags(row.try_get("equipment_tags")?),
        accessibility_tags: split_tags(row.try_get("accessibility_tags")?),
    })
}

/// Insert a rating with its tag rows; returns the new rating id
pub async fn create_rating(pool: &SqlitePool, rating: &NewRating) -> Result<i64, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let mut tx = begin_write(pool).await?;

    let result = sqlx::query(
        r#"
        INSERT INTO ratings (user_id, location_id, score, noise, cleanliness, equipment_quality, wifi_strength, comment, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(rating.user_id)
    .bind(rating.location_id)
    .bind(rating.score)
    .bind(rating.noise)
    .bind(rating.cleanliness)
    .bind(rating.equipment_quality)
    .bind(rating.wifi_strength)
    .bind(&rating.comment)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    let rating_id = result.last_insert_rowid();

    for tag in &rating.equipment_tags {
        sqlx::query("INSERT OR IGNORE INTO rating_equipment (rating_id, tag) VALUES (?, ?)")
            .bind(rating_id)
            .bind(tag.as_str())
            .execute(&mut *tx)
            .await?;
    }

    for tag in &rating.accessibility_tags {
        sqlx::query("INSERT OR IGNORE INTO rating_accessibility (rating_id, tag) VALUES (?, ?)")
            .bind(rating_id)
            .bind(tag.as_str())
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    tracing::debug!(rating_id, location_id = rating.location_id, "Created rating");
    Ok(rating_id)
}

pub async fn get_rating(pool: &SqlitePool, id: i64) -> Result<Option<RatingRow>, SqliteError> {
    let sql = format!("{} WHERE rt.id = ?", RATING_SELECT);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    row.as_ref().map(rating_from_row).transpose()
}

/// Ratings of a location, newest first
pub async fn list_for_location(
    pool: &SqlitePool,
    location_id: i64,
) -> Result<Vec<RatingRow>, SqliteError> {
    let sql = format!(
        "{} WHERE rt.location_id = ? ORDER BY rt.created_at DESC, rt.id DESC",
        RATING_SELECT
    );
    let rows = sqlx::query(&sql).bind(location_id).fetch_all(pool).await?;
    rows.iter().map(rating_from_row).collect()
}

pub async fn summary_for_location(
    pool: &SqlitePool,
    location_id: i64,
) -> Result<RatingSummary, SqliteError> {
    let (count, average_score): (i64, Option<f64>) =
        sqlx::query_as("SELECT COUNT(*), AVG(score) FROM ratings WHERE location_id = ?")
            .bind(location_id)
            .fetch_one(pool)
            .await?;

    Ok(RatingSummary {
        count,
        average_score,
    })
}

/// Most recent ratings, optionally narrowed by author and university
pub async fn list_recent(
    pool: &SqlitePool,
    filter: &ReviewFilter,
) -> Result<Vec<RatingRow>, SqliteError> {
    let sql = format!(
        "{} WHERE (? IS NULL OR u.username = ?) AND (? IS NULL OR l.university_id = ?) \
         ORDER BY rt.created_at DESC, rt.id DESC LIMIT ?",
        RATING_SELECT
    );
    let rows = sqlx::query(&sql)
        .bind(&filter.username)
        .bind(&filter.username)
        .bind(filter.university_id)
        .bind(filter.university_id)
        .bind(filter.limit)
        .fetch_all(pool)
        .await?;
    rows.iter().map(rating_from_row).collect()
}
