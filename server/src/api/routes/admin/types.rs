//! Admin API DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::types::{not_blank, validate_state};
use crate::data::types::{RequestStatus, UserRole, UserRow};

use super::super::universities::types::UniversityDto;

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminUserDto {
    pub id: i64,
    pub username: String,
    pub role: UserRole,
    pub university_id: Option<i64>,
    pub created_at: i64,
}

impl From<UserRow> for AdminUserDto {
    fn from(u: UserRow) -> Self {
        Self {
            id: u.id,
            username: u.username,
            role: u.role,
            university_id: u.university_id,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UsersResponse {
    pub users: Vec<AdminUserDto>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUniversityRequest {
    #[validate(
        length(min = 1, max = 200, message = "Name must be 1-200 characters"),
        custom(function = "not_blank")
    )]
    pub name: String,
    #[validate(custom(function = "validate_state"))]
    pub state: String,
    #[validate(length(max = 500, message = "wiki_url must be at most 500 characters"))]
    pub wiki_url: Option<String>,
}

/// Name of a campus or building to create
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateNamedRequest {
    #[validate(
        length(min = 1, max = 200, message = "Name must be 1-200 characters"),
        custom(function = "not_blank")
    )]
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UniversityCreatedResponse {
    pub university: UniversityDto,
    /// False when the university already existed
    pub created: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UniversitiesResponse {
    pub universities: Vec<UniversityDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CampusCreatedResponse {
    pub id: i64,
    pub university_id: i64,
    pub name: String,
    pub created: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BuildingCreatedResponse {
    pub location_id: i64,
    pub campus_id: i64,
    pub name: String,
    pub created: bool,
}

/// Query params for listing room requests
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RequestsQuery {
    /// `pending` (default), `approved`, `rejected` or `all`
    pub status: Option<String>,
}

impl RequestsQuery {
    /// Status filter; `None` lists every request
    pub fn status_filter(&self) -> Result<Option<RequestStatus>, String> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(Some(RequestStatus::Pending)),
            Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
            Some(s) => s.parse().map(Some).map_err(|e| format!("{}", e)),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ResolveResponse {
    pub request_id: i64,
    pub status: RequestStatus,
    /// Location created by an approval
    pub location_id: Option<i64>,
}
