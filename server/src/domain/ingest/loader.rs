//! Bulk loaders for ingestion documents
//!
//! Each loader runs one transaction per input document. Universities,
//! campuses and buildings are create-if-absent; rooms are always inserted,
//! so loading the same room document twice duplicates its rooms.

use std::collections::HashMap;

use sqlx::{SqliteConnection, SqlitePool};

use super::IngestError;
use super::clean::normalize_attributes;
use super::types::{CleanRoom, LibraryMap, LoadReport, StudyRoomRecord, UniversityRecord};
use crate::data::sqlite::{SqliteError, begin_write};
use crate::data::sqlite::repositories::{
    ensure_campus, ensure_structure, ensure_university, insert_room,
};
use crate::data::types::{LocationKind, NewRoom, RoomSize, RoomType};
use crate::domain::location::room_number_from_name;

/// Insert universities not already present by `(name, state)`
pub async fn load_universities(
    pool: &SqlitePool,
    records: &[UniversityRecord],
) -> Result<LoadReport, IngestError> {
    let mut report = LoadReport::default();
    let mut tx = begin_write(pool).await.map_err(SqliteError::from)?;

    for (index, record) in records.iter().enumerate() {
        let name = record.name.trim();
        let state = record.state.trim();
        if name.is_empty() || state.is_empty() {
            return Err(IngestError::InvalidRecord {
                index,
                reason: "university name and state are required".to_string(),
            });
        }
        let wiki_url = record
            .wiki_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty());

        if ensure_university(&mut *tx, name, state, wiki_url)
            .await?
            .was_created()
        {
            report.inserted += 1;
        } else {
            report.skipped += 1;
        }
    }

    tx.commit().await.map_err(SqliteError::from)?;
    tracing::info!(
        inserted = report.inserted,
        skipped = report.skipped,
        "Loaded universities"
    );
    Ok(report)
}

/// Campus and building ids resolved during one load
#[derive(Default)]
struct StructureCache {
    campuses: HashMap<String, i64>,
    buildings: HashMap<(i64, String), i64>,
}

impl StructureCache {
    async fn campus(
        &mut self,
        conn: &mut SqliteConnection,
        university_id: i64,
        name: &str,
        report: &mut LoadReport,
    ) -> Result<i64, SqliteError> {
        if let Some(id) = self.campuses.get(name) {
            return Ok(*id);
        }
        let campus = ensure_campus(conn, university_id, name).await?;
        if campus.was_created() {
            report.campuses_created += 1;
        }
        let id = campus.into_inner().id;
        self.campuses.insert(name.to_string(), id);
        Ok(id)
    }

    async fn building(
        &mut self,
        conn: &mut SqliteConnection,
        university_id: i64,
        campus_id: i64,
        name: &str,
        report: &mut LoadReport,
    ) -> Result<i64, SqliteError> {
        let key = (campus_id, name.to_string());
        if let Some(id) = self.buildings.get(&key) {
            return Ok(*id);
        }
        let building =
            ensure_structure(conn, university_id, campus_id, LocationKind::Building, name).await?;
        if building.was_created() {
            report.buildings_created += 1;
        }
        let id = building.into_inner();
        self.buildings.insert(key, id);
        Ok(id)
    }
}

/// Insert cleaned classroom records for one university
pub async fn load_rooms(
    pool: &SqlitePool,
    university_id: i64,
    rooms: &[CleanRoom],
) -> Result<LoadReport, IngestError> {
    let mut report = LoadReport::default();
    let mut cache = StructureCache::default();
    let mut tx = begin_write(pool).await.map_err(SqliteError::from)?;

    for (index, room) in rooms.iter().enumerate() {
        let name = room.room.trim();
        if name.is_empty() {
            return Err(IngestError::InvalidRecord {
                index,
                reason: "room name is empty".to_string(),
            });
        }

        let (campus, building) = (room.campus.trim(), room.building.trim());
        if campus.is_empty() || building.is_empty() {
            return Err(IngestError::InvalidRecord {
                index,
                reason: format!("room '{}' has no campus or building", name),
            });
        }

        let campus_id = cache
            .campus(&mut *tx, university_id, campus, &mut report)
            .await?;
        let building_id = cache
            .building(&mut *tx, university_id, campus_id, building, &mut report)
            .await?;

        let room_number = room
            .room_number
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| room_number_from_name(name));

        insert_room(
            &mut *tx,
            &NewRoom {
                university_id,
                campus_id,
                building_id,
                name: name.to_string(),
                room_number,
                room_type: RoomType::Classroom,
                room_size: RoomSize::Medium,
                floor: None,
                capacity: None,
                image_url: None,
                attributes: room.attributes.clone(),
            },
        )
        .await?;
        report.inserted += 1;
    }

    tx.commit().await.map_err(SqliteError::from)?;
    tracing::info!(
        university_id,
        rooms = report.inserted,
        campuses_created = report.campuses_created,
        buildings_created = report.buildings_created,
        "Loaded rooms"
    );
    Ok(report)
}

/// Name of the building standing in for an unknown library building
pub fn placeholder_building(campus: &str) -> String {
    format!("Unknown Building ({})", campus)
}

/// Insert library study rooms for one university
///
/// Every record's library must appear in `library_map`.
pub async fn load_study_rooms(
    pool: &SqlitePool,
    university_id: i64,
    library_map: &LibraryMap,
    rooms: &[StudyRoomRecord],
) -> Result<LoadReport, IngestError> {
    if let Some(missing) = rooms.iter().find(|r| !library_map.contains_key(&r.library)) {
        return Err(IngestError::UnknownLibrary(missing.library.clone()));
    }

    let mut report = LoadReport::default();
    let mut cache = StructureCache::default();
    let mut tx = begin_write(pool).await.map_err(SqliteError::from)?;

    for (index, room) in rooms.iter().enumerate() {
        let Some(target) = library_map.get(&room.library) else {
            return Err(IngestError::UnknownLibrary(room.library.clone()));
        };
        let name = room.room_name.trim();
        if name.is_empty() {
            return Err(IngestError::InvalidRecord {
                index,
                reason: "study room name is empty".to_string(),
            });
        }

        let campus = target.campus.trim();
        if campus.is_empty() {
            return Err(IngestError::InvalidRecord {
                index,
                reason: format!("library '{}' maps to an empty campus", room.library),
            });
        }
        let building = target
            .building
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| placeholder_building(campus));

        let campus_id = cache
            .campus(&mut *tx, university_id, campus, &mut report)
            .await?;
        let building_id = cache
            .building(&mut *tx, university_id, campus_id, &building, &mut report)
            .await?;

        insert_room(
            &mut *tx,
            &NewRoom {
                university_id,
                campus_id,
                building_id,
                name: name.to_string(),
                room_number: None,
                room_type: RoomType::StudyRoom,
                room_size: RoomSize::Small,
                floor: room.floor.clone(),
                capacity: room.capacity,
                image_url: room.image_url.clone(),
                attributes: normalize_attributes(&room.amenities),
            },
        )
        .await?;
        report.inserted += 1;
    }

    tx.commit().await.map_err(SqliteError::from)?;
    tracing::info!(
        university_id,
        rooms = report.inserted,
        buildings_created = report.buildings_created,
        "Loaded study rooms"
    );
    Ok(report)
}
