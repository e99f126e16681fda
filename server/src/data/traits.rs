//! Repository trait for the transactional store
//!
//! API handlers work against `CampusRepository` so they never touch a pool
//! directly. Bulk loaders that need one transaction across many statements
//! use the SQLite repositories with an explicit transaction instead.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::types::{
    CampusRow, LocationRow, LocationSearchParams, NewRating, NewRoomRequest, RatingRow,
    RatingSummary, RequestResolution, RequestStatus, ReviewFilter, RoomRequestRow, UniversityRow,
    UniversitySummary, Upserted, UserRole, UserRow,
};

/// Repository trait for catalog, account, rating and request operations
#[async_trait]
pub trait CampusRepository: Send + Sync {
    // ==================== University Operations ====================

    /// Exact `(name, state)` lookup
    async fn find_university(
        &self,
        name: &str,
        state: &str,
    ) -> Result<Option<UniversityRow>, DataError>;

    /// All universities with this name, optionally narrowed by state
    async fn find_universities_by_name(
        &self,
        name: &str,
        state: Option<&str>,
    ) -> Result<Vec<UniversityRow>, DataError>;

    async fn get_university(&self, id: i64) -> Result<Option<UniversityRow>, DataError>;

    async fn list_universities(&self) -> Result<Vec<UniversityRow>, DataError>;

    async fn search_universities(
        &self,
        q: Option<&str>,
        state: Option<&str>,
        limit: i64,
    ) -> Result<Vec<UniversitySummary>, DataError>;

    /// Create-if-absent by `(name, state)`
    async fn create_university(
        &self,
        name: &str,
        state: &str,
        wiki_url: Option<&str>,
    ) -> Result<Upserted<UniversityRow>, DataError>;

    /// `Ok(false)` if absent, `DataError::Conflict` while campuses reference it
    async fn delete_university(&self, id: i64) -> Result<bool, DataError>;

    // ==================== Campus Operations ====================

    /// Create-if-absent by `(university_id, name)`
    async fn create_campus(
        &self,
        university_id: i64,
        name: &str,
    ) -> Result<Upserted<CampusRow>, DataError>;

    async fn find_campus(
        &self,
        university_id: i64,
        name: &str,
    ) -> Result<Option<CampusRow>, DataError>;

    async fn get_campus(&self, id: i64) -> Result<Option<CampusRow>, DataError>;

    async fn list_campuses(&self, university_id: i64) -> Result<Vec<CampusRow>, DataError>;

    // ==================== Location Operations ====================

    /// Create-if-absent building on a campus; returns the location id
    async fn create_building(
        &self,
        university_id: i64,
        campus_id: i64,
        name: &str,
    ) -> Result<Upserted<i64>, DataError>;

    async fn get_location(&self, id: i64) -> Result<Option<LocationRow>, DataError>;

    async fn list_locations(&self, university_id: i64) -> Result<Vec<LocationRow>, DataError>;

    async fn find_locations_by_name(
        &self,
        university_id: i64,
        campus: Option<&str>,
        name: &str,
    ) -> Result<Vec<LocationRow>, DataError>;

    async fn find_rooms_by_number(
        &self,
        university_id: i64,
        campus: Option<&str>,
        building: &str,
        room_number: &str,
    ) -> Result<Vec<LocationRow>, DataError>;

    async fn find_building(&self, campus_id: i64, name: &str) -> Result<Option<i64>, DataError>;

    async fn room_attributes(&self, location_id: i64) -> Result<Vec<String>, DataError>;

    async fn search_locations(
        &self,
        params: &LocationSearchParams,
    ) -> Result<Vec<LocationRow>, DataError>;

    // ==================== User Operations ====================

    /// `DataError::Conflict` when the username is taken
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: UserRole,
        university_id: Option<i64>,
    ) -> Result<UserRow, DataError>;

    async fn get_user(&self, id: i64) -> Result<Option<UserRow>, DataError>;

    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>, DataError>;

    async fn list_users(&self) -> Result<Vec<UserRow>, DataError>;

    /// `None` if the user does not exist
    async fn set_user_role(
        &self,
        username: &str,
        role: UserRole,
    ) -> Result<Option<UserRow>, DataError>;

    async fn upsert_admin(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Upserted<UserRow>, DataError>;

    // ==================== Rating Operations ====================

    /// Insert a rating and its tags atomically; returns the rating id
    async fn create_rating(&self, rating: &NewRating) -> Result<i64, DataError>;

    async fn get_rating(&self, id: i64) -> Result<Option<RatingRow>, DataError>;

    async fn list_ratings_for_location(
        &self,
        location_id: i64,
    ) -> Result<Vec<RatingRow>, DataError>;

    async fn rating_summary(&self, location_id: i64) -> Result<RatingSummary, DataError>;

    async fn list_recent_ratings(&self, filter: &ReviewFilter)
    -> Result<Vec<RatingRow>, DataError>;

    // ==================== Room Request Operations ====================

    async fn create_room_request(&self, request: &NewRoomRequest) -> Result<i64, DataError>;

    async fn get_room_request(&self, id: i64) -> Result<Option<RoomRequestRow>, DataError>;

    async fn list_room_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<RoomRequestRow>, DataError>;

    async fn approve_room_request(&self, id: i64) -> Result<RequestResolution, DataError>;

    async fn reject_room_request(&self, id: i64) -> Result<RequestResolution, DataError>;
}
