//! SQLite repositories
//!
//! Types (UniversityRow, LocationRow, etc.) should be imported from `crate::data::types`.
//! Functions that participate in a caller's transaction take a
//! `&mut SqliteConnection`; standalone reads take the pool.

pub mod campus;
pub mod location;
pub mod rating;
pub mod room_request;
pub mod university;
pub mod user;

use std::str::FromStr;

use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::data::sqlite::SqliteError;
use crate::data::types::UnknownVariant;

pub use campus::{ensure_campus, find_campus, get_campus, list_campuses};
pub use location::{
    ensure_structure, find_building, find_by_name as find_locations_by_name,
    find_rooms_by_number, get_location, insert_room, list_for_university as list_locations,
    room_attributes, search_locations,
};
pub use rating::{
    create_rating, get_rating, list_for_location as list_ratings_for_location, list_recent,
    summary_for_location,
};
pub use room_request::{approve_request, create_request, get_request, list_requests, reject_request};
pub use university::{
    delete_university, ensure_university, find_by_name as find_universities_by_name,
    find_university, get_university, list_universities, search_universities,
};
pub use user::{create_user, get_by_username, get_user, list_users, set_role, upsert_admin};

/// Decode a TEXT column into one of the closed vocabularies
fn decode_enum<T>(row: &SqliteRow, col: &str) -> Result<T, SqliteError>
where
    T: FromStr<Err = UnknownVariant>,
{
    let raw: String = row.try_get(col)?;
    Ok(raw.parse()?)
}

/// Decode a nullable TEXT column into one of the closed vocabularies
fn decode_opt_enum<T>(row: &SqliteRow, col: &str) -> Result<Option<T>, SqliteError>
where
    T: FromStr<Err = UnknownVariant>,
{
    let raw: Option<String> = row.try_get(col)?;
    Ok(raw.map(|s| s.parse()).transpose()?)
}
