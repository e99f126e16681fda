//! Room request repository for SQLite operations
//!
//! Requests carry ids resolved at submission time. Approval creates the
//! requested location and marks the request in one transaction.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::location::{ensure_structure, insert_room};
use super::decode_enum;
use crate::data::sqlite::{SqliteError, begin_write};
use crate::data::types::{
    LocationKind, NewRoom, NewRoomRequest, RequestResolution, RequestStatus, RoomRequestRow,
    RoomSize, RoomType,
};

const REQUEST_SELECT: &str = r#"
    SELECT rr.id, rr.room_name, rr.location_kind, rr.requested_by, u.username AS requested_by_username,
           rr.university_id, un.name AS university_name, rr.campus_id, c.name AS campus_name,
           rr.building_id, b.name AS building_name, rr.status, rr.created_location_id,
           rr.created_at, rr.resolved_at
    FROM room_requests rr
    JOIN users u ON u.id = rr.requested_by
    JOIN university un ON un.id = rr.university_id
    JOIN campus c ON c.id = rr.campus_id
    LEFT JOIN location b ON b.id = rr.building_id
"#;

fn request_from_row(row: &SqliteRow) -> Result<RoomRequestRow, SqliteError> {
    Ok(RoomRequestRow {
        id: row.try_get("id")?,
        room_name: row.try_get("room_name")?,
        location_kind: decode_enum(row, "location_kind")?,
        requested_by: row.try_get("requested_by")?,
        requested_by_username: row.try_get("requested_by_username")?,
        university_id: row.try_get("university_id")?,
        university_name: row.try_get("university_name")?,
        campus_id: row.try_get("campus_id")?,
        campus_name: row.try_get("campus_name")?,
        building_id: row.try_get("building_id")?,
        building_name: row.try_get("building_name")?,
        status: decode_enum(row, "status")?,
        created_location_id: row.try_get("created_location_id")?,
        created_at: row.try_get("created_at")?,
        resolved_at: row.try_get("resolved_at")?,
    })
}

/// Insert a pending request; returns its id
pub async fn create_request(
    pool: &SqlitePool,
    request: &NewRoomRequest,
) -> Result<i64, SqliteError> {
    let now = chrono::Utc::now().timestamp();
    let building_kind = request.building_id.map(|_| "building");

    let result = sqlx::query(
        r#"
        INSERT INTO room_requests (room_name, location_kind, requested_by, university_id, campus_id, building_id, building_kind, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, 'pending', ?)
        "#,
    )
    .bind(&request.room_name)
    .bind(request.location_kind.as_str())
    .bind(request.requested_by)
    .bind(request.university_id)
    .bind(request.campus_id)
    .bind(request.building_id)
    .bind(building_kind)
    .bind(now)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(request_id = id, room = %request.room_name, "Room request submitted");
    Ok(id)
}

pub async fn get_request(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<RoomRequestRow>, SqliteError> {
    let sql = format!("{} WHERE rr.id = ?", REQUEST_SELECT);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    row.as_ref().map(request_from_row).transpose()
}

/// Requests in submission order, optionally restricted to one status
pub async fn list_requests(
    pool: &SqlitePool,
    status: Option<RequestStatus>,
) -> Result<Vec<RoomRequestRow>, SqliteError> {
    let sql = format!(
        "{} WHERE (? IS NULL OR rr.status = ?) ORDER BY rr.created_at, rr.id",
        REQUEST_SELECT
    );
    let status = status.map(|s| s.as_str());
    let rows = sqlx::query(&sql)
        .bind(status)
        .bind(status)
        .fetch_all(pool)
        .await?;
    rows.iter().map(request_from_row).collect()
}

/// Approve a pending request, creating the requested location
///
/// Buildings and non-buildings reuse an existing location of the same name
/// on the campus. Rooms are created as `other` / `medium`.
pub async fn approve_request(pool: &SqlitePool, id: i64) -> Result<RequestResolution, SqliteError> {
    let mut tx = begin_write(pool).await?;

    let row = sqlx::query(
        "SELECT room_name, location_kind, university_id, campus_id, building_id, status FROM room_requests WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(row) = row else {
        return Ok(RequestResolution::NotFound);
    };

    let status: RequestStatus = decode_enum(&row, "status")?;
    if status != RequestStatus::Pending {
        return Ok(RequestResolution::AlreadyResolved(status));
    }

    let room_name: String = row.try_get("room_name")?;
    let kind: LocationKind = decode_enum(&row, "location_kind")?;
    let university_id: i64 = row.try_get("university_id")?;
    let campus_id: i64 = row.try_get("campus_id")?;
    let building_id: Option<i64> = row.try_get("building_id")?;

    let location_id = match (kind, building_id) {
        (LocationKind::Room, Some(building_id)) => {
            let room = NewRoom {
                university_id,
                campus_id,
                building_id,
                room_number: crate::domain::location::room_number_from_name(&room_name),
                name: room_name,
                room_type: RoomType::Other,
                room_size: RoomSize::Medium,
                floor: None,
                capacity: None,
                image_url: None,
                attributes: Vec::new(),
            };
            insert_room(&mut *tx, &room).await?
        }
        (LocationKind::Room, None) => {
            return Err(SqliteError::Invalid(format!(
                "room request {} has no building",
                id
            )));
        }
        (kind, _) => ensure_structure(&mut *tx, university_id, campus_id, kind, &room_name)
            .await?
            .into_inner(),
    };

    let now = chrono::Utc::now().timestamp();
    let updated = sqlx::query(
        "UPDATE room_requests SET status = 'approved', created_location_id = ?, resolved_at = ? WHERE id = ? AND status = 'pending'",
    )
    .bind(location_id)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        // Resolved concurrently
        drop(tx);
        return current_resolution(pool, id).await;
    }

    tx.commit().await?;

    tracing::debug!(request_id = id, location_id, "Room request approved");
    Ok(RequestResolution::Resolved {
        location_id: Some(location_id),
    })
}

/// Reject a pending request
pub async fn reject_request(pool: &SqlitePool, id: i64) -> Result<RequestResolution, SqliteError> {
    let now = chrono::Utc::now().timestamp();
    let updated = sqlx::query(
        "UPDATE room_requests SET status = 'rejected', resolved_at = ? WHERE id = ? AND status = 'pending'",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if updated.rows_affected() > 0 {
        tracing::debug!(request_id = id, "Room request rejected");
        return Ok(RequestResolution::Resolved { location_id: None });
    }

    current_resolution(pool, id).await
}

/// Resolution reported for a request that could not be moved out of pending
async fn current_resolution(pool: &SqlitePool, id: i64) -> Result<RequestResolution, SqliteError> {
    let status: Option<String> = sqlx::query_scalar("SELECT status FROM room_requests WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match status {
        Some(s) => Ok(RequestResolution::AlreadyResolved(s.parse()?)),
        None => Ok(RequestResolution::NotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::{
        campus::ensure_campus, location::get_location, university::ensure_university,
        user::create_user,
    };
    use crate::data::sqlite::test_pool;
    use crate::data::types::UserRole;

    struct Seed {
        user_id: i64,
        university_id: i64,
        campus_id: i64,
        building_id: i64,
    }

    async fn seed(pool: &SqlitePool) -> Seed {
        let user = create_user(pool, "jdoe", "hash", UserRole::User, None)
            .await
            .unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let uni = ensure_university(&mut conn, "University of Southern Maine", "ME", None)
            .await
            .unwrap()
            .into_inner();
        let campus = ensure_campus(&mut conn, uni.id, "Portland").await.unwrap().into_inner();
        let building_id =
            ensure_structure(&mut conn, uni.id, campus.id, LocationKind::Building, "Glickman Library")
                .await
                .unwrap()
                .into_inner();
        Seed {
            user_id: user.id,
            university_id: uni.id,
            campus_id: campus.id,
            building_id,
        }
    }

    fn request(s: &Seed, name: &str, kind: LocationKind, building_id: Option<i64>) -> NewRoomRequest {
        NewRoomRequest {
            room_name: name.to_string(),
            location_kind: kind,
            requested_by: s.user_id,
            university_id: s.university_id,
            campus_id: s.campus_id,
            building_id,
        }
    }

    #[tokio::test]
    async fn test_approve_room_request_creates_room() {
        let pool = test_pool().await;
        let s = seed(&pool).await;
        let id = create_request(
            &pool,
            &request(&s, "Glickman Library 423", LocationKind::Room, Some(s.building_id)),
        )
        .await
        .unwrap();

        let pending = list_requests(&pool, Some(RequestStatus::Pending)).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].building_name.as_deref(), Some("Glickman Library"));
        assert_eq!(pending[0].requested_by_username, "jdoe");

        let resolution = approve_request(&pool, id).await.unwrap();
        let RequestResolution::Resolved {
            location_id: Some(location_id),
        } = resolution
        else {
            panic!("unexpected resolution: {resolution:?}");
        };

        let location = get_location(&pool, location_id).await.unwrap().unwrap();
        assert_eq!(location.kind, LocationKind::Room);
        assert_eq!(location.building_id, Some(s.building_id));
        assert_eq!(location.room_number.as_deref(), Some("423"));

        let approved = get_request(&pool, id).await.unwrap().unwrap();
        assert_eq!(approved.status, RequestStatus::Approved);
        assert_eq!(approved.created_location_id, Some(location_id));
        assert!(approved.resolved_at.is_some());

        assert_eq!(
            approve_request(&pool, id).await.unwrap(),
            RequestResolution::AlreadyResolved(RequestStatus::Approved)
        );
    }

    #[tokio::test]
    async fn test_approve_building_reuses_existing() {
        let pool = test_pool().await;
        let s = seed(&pool).await;
        let id = create_request(
            &pool,
            &request(&s, "Glickman Library", LocationKind::Building, None),
        )
        .await
        .unwrap();

        assert_eq!(
            approve_request(&pool, id).await.unwrap(),
            RequestResolution::Resolved {
                location_id: Some(s.building_id)
            }
        );
    }

    #[tokio::test]
    async fn test_reject_request() {
        let pool = test_pool().await;
        let s = seed(&pool).await;
        let id = create_request(&pool, &request(&s, "Quad", LocationKind::Nonbuilding, None))
            .await
            .unwrap();

        assert_eq!(
            reject_request(&pool, id).await.unwrap(),
            RequestResolution::Resolved { location_id: None }
        );
        assert_eq!(
            reject_request(&pool, id).await.unwrap(),
            RequestResolution::AlreadyResolved(RequestStatus::Rejected)
        );
        assert_eq!(
            reject_request(&pool, 404).await.unwrap(),
            RequestResolution::NotFound
        );
        assert!(list_requests(&pool, Some(RequestStatus::Pending)).await.unwrap().is_empty());
        assert_eq!(list_requests(&pool, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_room_request_requires_building() {
        let pool = test_pool().await;
        let s = seed(&pool).await;
        let err = create_request(&pool, &request(&s, "Orphan 1", LocationKind::Room, None))
            .await
            .unwrap_err();
        assert!(matches!(err, SqliteError::Database(_)));
    }
}
