//! Room request DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::types::{not_blank, validate_state};
use crate::data::types::{LocationKind, RequestStatus, RoomRequestRow};

/// Body of `/api/request-room`
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RoomRequestBody {
    #[validate(
        length(min = 1, max = 300, message = "room_name must be 1-300 characters"),
        custom(function = "not_blank")
    )]
    pub room_name: String,
    #[validate(
        length(min = 1, max = 200, message = "university_name must be 1-200 characters"),
        custom(function = "not_blank")
    )]
    pub university_name: String,
    #[validate(custom(function = "validate_state"))]
    pub state: String,
    #[validate(
        length(min = 1, max = 200, message = "campus_name must be 1-200 characters"),
        custom(function = "not_blank")
    )]
    pub campus_name: String,
    /// Required when `location_type` is `room`
    pub building_name: Option<String>,
    /// `building`, `nonbuilding` or `room`
    pub location_type: String,
    /// Required with auth disabled
    pub username: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoomRequestResponse {
    pub message: String,
    pub request_id: i64,
}

/// Room request as listed for admins
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomRequestDto {
    pub id: i64,
    pub room_name: String,
    pub location_type: LocationKind,
    pub requested_by: String,
    pub university_name: String,
    pub campus_name: String,
    pub building_name: Option<String>,
    pub status: RequestStatus,
    pub created_location_id: Option<i64>,
    pub created_at: i64,
    pub resolved_at: Option<i64>,
}

impl From<RoomRequestRow> for RoomRequestDto {
    fn from(r: RoomRequestRow) -> Self {
        Self {
            id: r.id,
            room_name: r.room_name,
            location_type: r.location_kind,
            requested_by: r.requested_by_username,
            university_name: r.university_name,
            campus_name: r.campus_name,
            building_name: r.building_name,
            status: r.status,
            created_location_id: r.created_location_id,
            created_at: r.created_at,
            resolved_at: r.resolved_at,
        }
    }
}
