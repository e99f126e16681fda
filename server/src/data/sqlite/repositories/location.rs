//! Location repository for SQLite operations
//!
//! Buildings and non-buildings are create-if-absent per campus. Rooms are
//! always inserted; `room_number` is advisory and never unique.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use super::{decode_enum, decode_opt_enum};
use crate::data::sqlite::SqliteError;
use crate::data::sqlite::filters::{LOCATION_SELECT, SqlValue, build_location_search};
use crate::data::types::{LocationKind, LocationRow, LocationSearchParams, NewRoom, Upserted};

fn location_from_row(row: &SqliteRow) -> Result<LocationRow, SqliteError> {
    Ok(LocationRow {
        id: row.try_get("id")?,
        university_id: row.try_get("university_id")?,
        campus_id: row.try_get("campus_id")?,
        campus_name: row.try_get("campus_name")?,
        name: row.try_get("name")?,
        kind: decode_enum(row, "kind")?,
        building_id: row.try_get("building_id")?,
        building_name: row.try_get("building_name")?,
        room_number: row.try_get("room_number")?,
        room_type: decode_opt_enum(row, "room_type")?,
        room_size: decode_opt_enum(row, "room_size")?,
    })
}

fn locations_from_rows(rows: &[SqliteRow]) -> Result<Vec<LocationRow>, SqliteError> {
    rows.iter().map(location_from_row).collect()
}

/// Insert a building or non-building unless one with that name exists on the campus
pub async fn ensure_structure(
    conn: &mut SqliteConnection,
    university_id: i64,
    campus_id: i64,
    kind: LocationKind,
    name: &str,
) -> Result<Upserted<i64>, SqliteError> {
    if kind == LocationKind::Room {
        return Err(SqliteError::Invalid(
            "rooms are inserted with insert_room".to_string(),
        ));
    }

    let now = chrono::Utc::now().timestamp();
    let inserted: Option<i64> = sqlx::query_scalar(
        r#"
        INSERT INTO location (university_id, campus_id, name, kind, created_at) VALUES (?, ?, ?, ?, ?)
        ON CONFLICT DO NOTHING
        RETURNING id
        "#,
    )
    .bind(university_id)
    .bind(campus_id)
    .bind(name)
    .bind(kind.as_str())
    .bind(now)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(id) = inserted {
        return Ok(Upserted::Created(id));
    }

    let existing: i64 =
        sqlx::query_scalar("SELECT id FROM location WHERE campus_id = ? AND kind = ? AND name = ?")
            .bind(campus_id)
            .bind(kind.as_str())
            .bind(name)
            .fetch_one(&mut *conn)
            .await?;

    Ok(Upserted::Existing(existing))
}

/// Insert a room location, its room row and its attributes
pub async fn insert_room(conn: &mut SqliteConnection, room: &NewRoom) -> Result<i64, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query(
        "INSERT INTO location (university_id, campus_id, name, kind, created_at) VALUES (?, ?, ?, 'room', ?)",
    )
    .bind(room.university_id)
    .bind(room.campus_id)
    .bind(&room.name)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    let location_id = result.last_insert_rowid();

    sqlx::query(
        r#"
        INSERT INTO rooms (location_id, building_id, room_number, room_type, room_size, floor, capacity, image_url)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(location_id)
    .bind(room.building_id)
    .bind(&room.room_number)
    .bind(room.room_type.as_str())
    .bind(room.room_size.as_str())
    .bind(&room.floor)
    .bind(room.capacity)
    .bind(&room.image_url)
    .execute(&mut *conn)
    .await?;

    for attribute in &room.attributes {
        sqlx::query("INSERT OR IGNORE INTO room_attributes (location_id, attribute) VALUES (?, ?)")
            .bind(location_id)
            .bind(attribute)
            .execute(&mut *conn)
            .await?;
    }

    Ok(location_id)
}

pub async fn get_location(pool: &SqlitePool, id: i64) -> Result<Option<LocationRow>, SqliteError> {
    let sql = format!("{} WHERE l.id = ?", LOCATION_SELECT);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    row.as_ref().map(location_from_row).transpose()
}

/// All locations of a university ordered by name
pub async fn list_for_university(
    pool: &SqlitePool,
    university_id: i64,
) -> Result<Vec<LocationRow>, SqliteError> {
    let sql = format!(
        "{} WHERE l.university_id = ? ORDER BY l.name, l.id",
        LOCATION_SELECT
    );
    let rows = sqlx::query(&sql).bind(university_id).fetch_all(pool).await?;
    locations_from_rows(&rows)
}

/// Locations whose raw name equals `name`, optionally within one campus
pub async fn find_by_name(
    pool: &SqlitePool,
    university_id: i64,
    campus: Option<&str>,
    name: &str,
) -> Result<Vec<LocationRow>, SqliteError> {
    let sql = format!(
        "{} WHERE l.university_id = ? AND l.name = ? AND (? IS NULL OR c.name = ?) ORDER BY l.id",
        LOCATION_SELECT
    );
    let rows = sqlx::query(&sql)
        .bind(university_id)
        .bind(name)
        .bind(campus)
        .bind(campus)
        .fetch_all(pool)
        .await?;
    locations_from_rows(&rows)
}

/// Rooms identified by parent building name and room number
pub async fn find_rooms_by_number(
    pool: &SqlitePool,
    university_id: i64,
    campus: Option<&str>,
    building: &str,
    room_number: &str,
) -> Result<Vec<LocationRow>, SqliteError> {
    let sql = format!(
        "{} WHERE l.university_id = ? AND l.kind = 'room' AND b.name = ? AND r.room_number = ? \
         AND (? IS NULL OR c.name = ?) ORDER BY l.id",
        LOCATION_SELECT
    );
    let rows = sqlx::query(&sql)
        .bind(university_id)
        .bind(building)
        .bind(room_number)
        .bind(campus)
        .bind(campus)
        .fetch_all(pool)
        .await?;
    locations_from_rows(&rows)
}

/// Id of the building with this name on the campus
pub async fn find_building(
    pool: &SqlitePool,
    campus_id: i64,
    name: &str,
) -> Result<Option<i64>, SqliteError> {
    let id = sqlx::query_scalar(
        "SELECT id FROM location WHERE campus_id = ? AND kind = 'building' AND name = ?",
    )
    .bind(campus_id)
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(id)
}

/// Attribute list of a room, sorted
pub async fn room_attributes(
    pool: &SqlitePool,
    location_id: i64,
) -> Result<Vec<String>, SqliteError> {
    let attributes = sqlx::query_scalar(
        "SELECT attribute FROM room_attributes WHERE location_id = ? ORDER BY attribute",
    )
    .bind(location_id)
    .fetch_all(pool)
    .await?;
    Ok(attributes)
}

/// Run a filtered location search
pub async fn search_locations(
    pool: &SqlitePool,
    search: &LocationSearchParams,
) -> Result<Vec<LocationRow>, SqliteError> {
    let (sql, params) = build_location_search(search);
    tracing::trace!(%sql, params = params.values.len(), "Location search");

    let mut query = sqlx::query(&sql);
    for value in params.values {
        query = match value {
            SqlValue::Int(v) => query.bind(v),
            SqlValue::Text(s) => query.bind(s),
        };
    }

    let rows = query.fetch_all(pool).await?;
    locations_from_rows(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::{campus::ensure_campus, university::ensure_university};
    use crate::data::sqlite::test_pool;
    use crate::data::types::{RoomSize, RoomType};

    struct Fixture {
        university_id: i64,
        portland: i64,
        gorham: i64,
        bailey: i64,
        luther: i64,
    }

    fn room(f: &Fixture, campus_id: i64, building_id: i64, name: &str, number: &str) -> NewRoom {
        NewRoom {
            university_id: f.university_id,
            campus_id,
            building_id,
            name: name.to_string(),
            room_number: Some(number.to_string()),
            room_type: RoomType::Classroom,
            room_size: RoomSize::Medium,
            floor: None,
            capacity: None,
            image_url: None,
            attributes: vec![],
        }
    }

    async fn fixture(pool: &SqlitePool) -> Fixture {
        let mut conn = pool.acquire().await.unwrap();
        let uni = ensure_university(&mut conn, "University of Southern Maine", "ME", None)
            .await
            .unwrap()
            .into_inner();
        let portland = ensure_campus(&mut conn, uni.id, "Portland").await.unwrap().into_inner();
        let gorham = ensure_campus(&mut conn, uni.id, "Gorham").await.unwrap().into_inner();
        let bailey = ensure_structure(&mut conn, uni.id, gorham.id, LocationKind::Building, "Bailey Hall")
            .await
            .unwrap()
            .into_inner();
        let luther = ensure_structure(
            &mut conn,
            uni.id,
            portland.id,
            LocationKind::Building,
            "Luther Bonney Hall",
        )
        .await
        .unwrap()
        .into_inner();
        Fixture {
            university_id: uni.id,
            portland: portland.id,
            gorham: gorham.id,
            bailey,
            luther,
        }
    }

    #[tokio::test]
    async fn test_ensure_structure_reuses_building() {
        let pool = test_pool().await;
        let f = fixture(&pool).await;
        let mut conn = pool.acquire().await.unwrap();

        let again = ensure_structure(&mut conn, f.university_id, f.gorham, LocationKind::Building, "Bailey Hall")
            .await
            .unwrap();
        assert_eq!(again, Upserted::Existing(f.bailey));

        // Same name on another campus is a different building
        let other = ensure_structure(&mut conn, f.university_id, f.portland, LocationKind::Building, "Bailey Hall")
            .await
            .unwrap();
        assert!(other.was_created());

        let err = ensure_structure(&mut conn, f.university_id, f.gorham, LocationKind::Room, "101")
            .await
            .unwrap_err();
        assert!(matches!(err, SqliteError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_insert_room_resolves_building() {
        let pool = test_pool().await;
        let f = fixture(&pool).await;
        let mut new_room = room(&f, f.gorham, f.bailey, "Bailey Hall 101", "101");
        new_room.attributes = vec!["presentation".into(), "no_pc".into()];

        let id = {
            let mut conn = pool.acquire().await.unwrap();
            insert_room(&mut conn, &new_room).await.unwrap()
        };

        let loc = get_location(&pool, id).await.unwrap().unwrap();
        assert_eq!(loc.kind, LocationKind::Room);
        assert_eq!(loc.building_name.as_deref(), Some("Bailey Hall"));
        assert_eq!(loc.campus_name, "Gorham");
        assert_eq!(loc.room_type, Some(RoomType::Classroom));
        assert_eq!(
            room_attributes(&pool, id).await.unwrap(),
            vec!["no_pc", "presentation"]
        );

        let building = get_location(&pool, f.bailey).await.unwrap().unwrap();
        assert_eq!(building.kind, LocationKind::Building);
        assert!(building.room_size.is_none());
    }

    #[tokio::test]
    async fn test_room_row_requires_room_location() {
        let pool = test_pool().await;
        let f = fixture(&pool).await;

        // A building location cannot carry a room row
        let err = sqlx::query(
            "INSERT INTO rooms (location_id, building_id, room_type, room_size) VALUES (?, ?, 'lab', 'small')",
        )
        .bind(f.luther)
        .bind(f.bailey)
        .execute(&pool)
        .await
        .unwrap_err();
        assert!(crate::data::sqlite::is_foreign_key_violation(&err));

        // A room's parent must be a building
        let room_id = {
            let mut conn = pool.acquire().await.unwrap();
            insert_room(&mut conn, &room(&f, f.gorham, f.bailey, "Bailey Hall 101", "101"))
                .await
                .unwrap()
        };
        let mut conn = pool.acquire().await.unwrap();
        let err = insert_room(&mut conn, &room(&f, f.gorham, room_id, "Nested 1", "1"))
            .await
            .unwrap_err();
        assert!(matches!(err, SqliteError::Database(_)));
    }

    #[tokio::test]
    async fn test_find_rooms_by_number_and_name() {
        let pool = test_pool().await;
        let f = fixture(&pool).await;
        {
            let mut conn = pool.acquire().await.unwrap();
            insert_room(&mut conn, &room(&f, f.gorham, f.bailey, "Bailey Hall 101", "101"))
                .await
                .unwrap();
            insert_room(&mut conn, &room(&f, f.portland, f.luther, "Luther Bonney 101", "101"))
                .await
                .unwrap();
        }

        let bailey = find_rooms_by_number(&pool, f.university_id, None, "Bailey Hall", "101")
            .await
            .unwrap();
        assert_eq!(bailey.len(), 1);

        let by_name = find_by_name(&pool, f.university_id, Some("Portland"), "Luther Bonney 101")
            .await
            .unwrap();
        assert_eq!(by_name.len(), 1);
        assert!(
            find_by_name(&pool, f.university_id, Some("Gorham"), "Luther Bonney 101")
                .await
                .unwrap()
                .is_empty()
        );

        assert_eq!(
            find_building(&pool, f.gorham, "Bailey Hall").await.unwrap(),
            Some(f.bailey)
        );
        assert_eq!(list_for_university(&pool, f.university_id).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_search_room_size_and_campus_filters() {
        let pool = test_pool().await;
        let f = fixture(&pool).await;
        {
            let mut conn = pool.acquire().await.unwrap();
            let sizes = [
                (RoomSize::Small, RoomType::Classroom, f.gorham, f.bailey),
                (RoomSize::Medium, RoomType::Lab, f.gorham, f.bailey),
                (RoomSize::Large, RoomType::Classroom, f.gorham, f.bailey),
                (RoomSize::Small, RoomType::Classroom, f.portland, f.luther),
            ];
            for (i, (size, room_type, campus, building)) in sizes.into_iter().enumerate() {
                let mut r = room(&f, campus, building, &format!("Room {}", i), &i.to_string());
                r.room_size = size;
                r.room_type = room_type;
                insert_room(&mut conn, &r).await.unwrap();
            }
        }

        let search = LocationSearchParams {
            university_id: f.university_id,
            room_sizes: vec![RoomSize::Small, RoomSize::Medium],
            limit: 200,
            ..Default::default()
        };
        let rows = search_locations(&pool, &search).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(
            rows.iter()
                .all(|r| matches!(r.room_size, Some(RoomSize::Small | RoomSize::Medium)))
        );

        let search = LocationSearchParams {
            campus: Some("Gorham".into()),
            room_types: vec![RoomType::Classroom],
            ..search
        };
        let rows = search_locations(&pool, &search).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Room 0");
        assert_eq!(rows[0].campus_name, "Gorham");
    }
}
