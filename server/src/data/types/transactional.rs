//! Row types for the transactional store
//!
//! Identifiers are store-generated `INTEGER` keys; timestamps are unix
//! seconds.

use serde::{Deserialize, Serialize};

use super::enums::{
    AccessibilityTag, EquipmentTag, LocationKind, RequestStatus, RoomSize, RoomType, UserRole,
};

// ============================================================================
// University / campus types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniversityRow {
    pub id: i64,
    pub name: String,
    pub state: String,
    pub wiki_url: Option<String>,
    pub created_at: i64,
}

/// University with the number of campuses (search results)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniversitySummary {
    pub id: i64,
    pub name: String,
    pub state: String,
    pub wiki_url: Option<String>,
    pub campus_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampusRow {
    pub id: i64,
    pub university_id: i64,
    pub name: String,
    pub created_at: i64,
}

/// Outcome of a create-if-absent operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upserted<T> {
    Created(T),
    Existing(T),
}

impl<T> Upserted<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Created(v) | Self::Existing(v) => v,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

// ============================================================================
// Location types
// ============================================================================

/// Location with its subtype details resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationRow {
    pub id: i64,
    pub university_id: i64,
    pub campus_id: i64,
    pub campus_name: String,
    pub name: String,
    pub kind: LocationKind,
    /// Parent building (rooms only)
    pub building_id: Option<i64>,
    pub building_name: Option<String>,
    pub room_number: Option<String>,
    pub room_type: Option<RoomType>,
    pub room_size: Option<RoomSize>,
}

/// Room to insert under an existing building location
#[derive(Debug, Clone)]
pub struct NewRoom {
    pub university_id: i64,
    pub campus_id: i64,
    pub building_id: i64,
    pub name: String,
    pub room_number: Option<String>,
    pub room_type: RoomType,
    pub room_size: RoomSize,
    pub floor: Option<String>,
    pub capacity: Option<i64>,
    pub image_url: Option<String>,
    pub attributes: Vec<String>,
}

// ============================================================================
// User types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub university_id: Option<i64>,
    pub created_at: i64,
}

// ============================================================================
// Rating types
// ============================================================================

/// Rating to insert; ids are already resolved
#[derive(Debug, Clone)]
pub struct NewRating {
    pub user_id: i64,
    pub location_id: i64,
    pub score: i64,
    pub noise: i64,
    pub cleanliness: i64,
    pub equipment_quality: i64,
    pub wifi_strength: i64,
    pub comment: Option<String>,
    pub equipment_tags: Vec<EquipmentTag>,
    pub accessibility_tags: Vec<AccessibilityTag>,
}

/// Rating joined with its author, target location and tags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingRow {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
    pub location_id: i64,
    pub location_name: String,
    pub location_kind: LocationKind,
    pub building_name: Option<String>,
    pub room_number: Option<String>,
    pub campus_name: String,
    pub university_name: String,
    pub score: i64,
    pub noise: i64,
    pub cleanliness: i64,
    pub equipment_quality: i64,
    pub wifi_strength: i64,
    pub comment: Option<String>,
    pub created_at: i64,
    pub equipment_tags: Vec<String>,
    pub accessibility_tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatingSummary {
    pub count: i64,
    pub average_score: Option<f64>,
}

/// Filters for the recent-reviews feed
#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    pub username: Option<String>,
    pub university_id: Option<i64>,
    pub limit: i64,
}

// ============================================================================
// Room request types
// ============================================================================

#[derive(Debug, Clone)]
pub struct NewRoomRequest {
    pub room_name: String,
    pub location_kind: LocationKind,
    pub requested_by: i64,
    pub university_id: i64,
    pub campus_id: i64,
    pub building_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomRequestRow {
    pub id: i64,
    pub room_name: String,
    pub location_kind: LocationKind,
    pub requested_by: i64,
    pub requested_by_username: String,
    pub university_id: i64,
    pub university_name: String,
    pub campus_id: i64,
    pub campus_name: String,
    pub building_id: Option<i64>,
    pub building_name: Option<String>,
    pub status: RequestStatus,
    pub created_location_id: Option<i64>,
    pub created_at: i64,
    pub resolved_at: Option<i64>,
}

/// Result of resolving a pending request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestResolution {
    /// Request resolved; carries the created location id when approved
    Resolved { location_id: Option<i64> },
    NotFound,
    /// Request was already approved or rejected
    AlreadyResolved(RequestStatus),
}
