//! CampusRepository trait implementation for SQLite
//!
//! Implements the CampusRepository trait for Arc<SqliteService> by delegating
//! to the repository functions.

use std::sync::Arc;

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::traits::CampusRepository;
use crate::data::types::{
    CampusRow, LocationKind, LocationRow, LocationSearchParams, NewRating, NewRoomRequest,
    RatingRow, RatingSummary, RequestResolution, RequestStatus, ReviewFilter, RoomRequestRow,
    UniversityRow, UniversitySummary, Upserted, UserRole, UserRow,
};

use super::{SqliteService, begin_write};
use super::repositories::{campus, location, rating, room_request, university, user};

#[async_trait]
impl CampusRepository for Arc<SqliteService> {
    // ==================== University Operations ====================

    async fn find_university(
        &self,
        name: &str,
        state: &str,
    ) -> Result<Option<UniversityRow>, DataError> {
        university::find_university(self.pool(), name, state)
            .await
            .map_err(Into::into)
    }

    async fn find_universities_by_name(
        &self,
        name: &str,
        state: Option<&str>,
    ) -> Result<Vec<UniversityRow>, DataError> {
        university::find_by_name(self.pool(), name, state)
            .await
            .map_err(Into::into)
    }

    async fn get_university(&self, id: i64) -> Result<Option<UniversityRow>, DataError> {
        university::get_university(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    async fn list_universities(&self) -> Result<Vec<UniversityRow>, DataError> {
        university::list_universities(self.pool())
            .await
            .map_err(Into::into)
    }

    async fn search_universities(
        &self,
        q: Option<&str>,
        state: Option<&str>,
        limit: i64,
    ) -> Result<Vec<UniversitySummary>, DataError> {
        university::search_universities(self.pool(), q, state, limit)
            .await
            .map_err(Into::into)
    }

    async fn create_university(
        &self,
        name: &str,
        state: &str,
        wiki_url: Option<&str>,
    ) -> Result<Upserted<UniversityRow>, DataError> {
        let mut tx = begin_write(self.pool()).await.map_err(DataError::Sqlite)?;
        let result = university::ensure_university(&mut *tx, name, state, wiki_url).await?;
        tx.commit().await.map_err(DataError::Sqlite)?;
        Ok(result)
    }

    async fn delete_university(&self, id: i64) -> Result<bool, DataError> {
        university::delete_university(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    // ==================== Campus Operations ====================

    async fn create_campus(
        &self,
        university_id: i64,
        name: &str,
    ) -> Result<Upserted<CampusRow>, DataError> {
        let mut tx = begin_write(self.pool()).await.map_err(DataError::Sqlite)?;
        let result = campus::ensure_campus(&mut *tx, university_id, name).await?;
        tx.commit().await.map_err(DataError::Sqlite)?;
        Ok(result)
    }

    async fn find_campus(
        &self,
        university_id: i64,
        name: &str,
    ) -> Result<Option<CampusRow>, DataError> {
        campus::find_campus(self.pool(), university_id, name)
            .await
            .map_err(Into::into)
    }

    async fn get_campus(&self, id: i64) -> Result<Option<CampusRow>, DataError> {
        campus::get_campus(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    async fn list_campuses(&self, university_id: i64) -> Result<Vec<CampusRow>, DataError> {
        campus::list_campuses(self.pool(), university_id)
            .await
            .map_err(Into::into)
    }

    // ==================== Location Operations ====================

    async fn create_building(
        &self,
        university_id: i64,
        campus_id: i64,
        name: &str,
    ) -> Result<Upserted<i64>, DataError> {
        let mut tx = begin_write(self.pool()).await.map_err(DataError::Sqlite)?;
        let result = location::ensure_structure(
            &mut *tx,
            university_id,
            campus_id,
            LocationKind::Building,
            name,
        )
        .await?;
        tx.commit().await.map_err(DataError::Sqlite)?;
        Ok(result)
    }

    async fn get_location(&self, id: i64) -> Result<Option<LocationRow>, DataError> {
        location::get_location(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    async fn list_locations(&self, university_id: i64) -> Result<Vec<LocationRow>, DataError> {
        location::list_for_university(self.pool(), university_id)
            .await
            .map_err(Into::into)
    }

    async fn find_locations_by_name(
        &self,
        university_id: i64,
        campus: Option<&str>,
        name: &str,
    ) -> Result<Vec<LocationRow>, DataError> {
        location::find_by_name(self.pool(), university_id, campus, name)
            .await
            .map_err(Into::into)
    }

    async fn find_rooms_by_number(
        &self,
        university_id: i64,
        campus: Option<&str>,
        building: &str,
        room_number: &str,
    ) -> Result<Vec<LocationRow>, DataError> {
        location::find_rooms_by_number(self.pool(), university_id, campus, building, room_number)
            .await
            .map_err(Into::into)
    }

    async fn find_building(&self, campus_id: i64, name: &str) -> Result<Option<i64>, DataError> {
        location::find_building(self.pool(), campus_id, name)
            .await
            .map_err(Into::into)
    }

    async fn room_attributes(&self, location_id: i64) -> Result<Vec<String>, DataError> {
        location::room_attributes(self.pool(), location_id)
            .await
            .map_err(Into::into)
    }

    async fn search_locations(
        &self,
        params: &LocationSearchParams,
    ) -> Result<Vec<LocationRow>, DataError> {
        location::search_locations(self.pool(), params)
            .await
            .map_err(Into::into)
    }

    // ==================== User Operations ====================

    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: UserRole,
        university_id: Option<i64>,
    ) -> Result<UserRow, DataError> {
        user::create_user(self.pool(), username, password_hash, role, university_id)
            .await
            .map_err(Into::into)
    }

    async fn get_user(&self, id: i64) -> Result<Option<UserRow>, DataError> {
        user::get_user(self.pool(), id).await.map_err(Into::into)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>, DataError> {
        user::get_by_username(self.pool(), username)
            .await
            .map_err(Into::into)
    }

    async fn list_users(&self) -> Result<Vec<UserRow>, DataError> {
        user::list_users(self.pool()).await.map_err(Into::into)
    }

    async fn set_user_role(
        &self,
        username: &str,
        role: UserRole,
    ) -> Result<Option<UserRow>, DataError> {
        user::set_role(self.pool(), username, role)
            .await
            .map_err(Into::into)
    }

    async fn upsert_admin(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Upserted<UserRow>, DataError> {
        user::upsert_admin(self.pool(), username, password_hash)
            .await
            .map_err(Into::into)
    }

    // ==================== Rating Operations ====================

    async fn create_rating(&self, new_rating: &NewRating) -> Result<i64, DataError> {
        rating::create_rating(self.pool(), new_rating)
            .await
            .map_err(Into::into)
    }

    async fn get_rating(&self, id: i64) -> Result<Option<RatingRow>, DataError> {
        rating::get_rating(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    async fn list_ratings_for_location(
        &self,
        location_id: i64,
    ) -> Result<Vec<RatingRow>, DataError> {
        rating::list_for_location(self.pool(), location_id)
            .await
            .map_err(Into::into)
    }

    async fn rating_summary(&self, location_id: i64) -> Result<RatingSummary, DataError> {
        rating::summary_for_location(self.pool(), location_id)
            .await
            .map_err(Into::into)
    }

    async fn list_recent_ratings(
        &self,
        filter: &ReviewFilter,
    ) -> Result<Vec<RatingRow>, DataError> {
        rating::list_recent(self.pool(), filter)
            .await
            .map_err(Into::into)
    }

    // ==================== Room Request Operations ====================

    async fn create_room_request(&self, request: &NewRoomRequest) -> Result<i64, DataError> {
        room_request::create_request(self.pool(), request)
            .await
            .map_err(Into::into)
    }

    async fn get_room_request(&self, id: i64) -> Result<Option<RoomRequestRow>, DataError> {
        room_request::get_request(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    async fn list_room_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<RoomRequestRow>, DataError> {
        room_request::list_requests(self.pool(), status)
            .await
            .map_err(Into::into)
    }

    async fn approve_room_request(&self, id: i64) -> Result<RequestResolution, DataError> {
        room_request::approve_request(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    async fn reject_room_request(&self, id: i64) -> Result<RequestResolution, DataError> {
        room_request::reject_request(self.pool(), id)
            .await
            .map_err(Into::into)
    }
}
