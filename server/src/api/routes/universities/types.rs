//! University API DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::types::validate_state;
use crate::data::types::{CampusRow, LocationKind, UniversityRow, UniversitySummary};
use crate::domain::location::ListedLocation;

/// Query params for university search
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SearchQuery {
    /// Substring of the university name
    #[validate(length(max = 200, message = "Query must be at most 200 characters"))]
    pub q: Option<String>,
    /// Exact state code
    pub state: Option<String>,
}

/// Query params for the university detail view
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UniversityQuery {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    #[validate(custom(function = "validate_state"))]
    pub state: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UniversitySummaryDto {
    pub id: i64,
    pub name: String,
    pub state: String,
    pub wiki_url: Option<String>,
    pub campus_count: i64,
}

impl From<UniversitySummary> for UniversitySummaryDto {
    fn from(u: UniversitySummary) -> Self {
        Self {
            id: u.id,
            name: u.name,
            state: u.state,
            wiki_url: u.wiki_url,
            campus_count: u.campus_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    pub results: Vec<UniversitySummaryDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UniversityDto {
    pub id: i64,
    pub name: String,
    pub state: String,
    pub wiki_url: Option<String>,
}

impl From<UniversityRow> for UniversityDto {
    fn from(u: UniversityRow) -> Self {
        Self {
            id: u.id,
            name: u.name,
            state: u.state,
            wiki_url: u.wiki_url,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CampusDto {
    pub id: i64,
    pub name: String,
}

impl From<CampusRow> for CampusDto {
    fn from(c: CampusRow) -> Self {
        Self {
            id: c.id,
            name: c.name,
        }
    }
}

/// Location entry of the detail view
#[derive(Debug, Serialize, ToSchema)]
pub struct ListedLocationDto {
    pub location_id: i64,
    /// `"<building> - Room <number>"` for numbered rooms, else the stored name
    pub location_name: String,
    pub db_location_name: String,
    pub location_type: LocationKind,
    pub campus_name: String,
    pub building_name: Option<String>,
}

impl From<ListedLocation> for ListedLocationDto {
    fn from(l: ListedLocation) -> Self {
        Self {
            location_id: l.location_id,
            location_name: l.display_name,
            db_location_name: l.db_location_name,
            location_type: l.kind,
            campus_name: l.campus_name,
            building_name: l.building_name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UniversityDetailResponse {
    pub university: UniversityDto,
    /// Ordered by name
    pub campuses: Vec<CampusDto>,
    pub locations: Vec<ListedLocationDto>,
}
