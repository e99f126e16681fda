//! Natural-key resolution at the API edge
//!
//! Requests name universities and locations the way users see them. These
//! helpers turn those names into store ids once, reporting ambiguity as a
//! conflict rather than picking one of several matches.

use crate::api::auth::AuthContext;
use crate::api::types::ApiError;
use crate::data::CampusRepository;
use crate::data::types::{LocationRow, UniversityRow, UserRow};
use crate::domain::location::{NameCandidate, name_candidates};

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Resolve a university by name, narrowed by state when given
pub async fn resolve_university(
    repo: &dyn CampusRepository,
    name: &str,
    state: Option<&str>,
) -> Result<UniversityRow, ApiError> {
    let name = name.trim();
    let mut matches = repo
        .find_universities_by_name(name, non_empty(state))
        .await
        .map_err(ApiError::from_data)?;

    match matches.len() {
        0 => Err(ApiError::not_found(
            "UNIVERSITY_NOT_FOUND",
            format!("University '{}' not found", name),
        )),
        1 => Ok(matches.remove(0)),
        n => Err(ApiError::conflict(
            "AMBIGUOUS_UNIVERSITY",
            format!("{} universities are named '{}'; pass a state", n, name),
        )),
    }
}

/// Look up a university by id
pub async fn university_by_id(
    repo: &dyn CampusRepository,
    id: i64,
) -> Result<UniversityRow, ApiError> {
    repo.get_university(id)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| {
            ApiError::not_found("UNIVERSITY_NOT_FOUND", format!("University {} not found", id))
        })
}

/// Resolve a user by username
pub async fn resolve_user(repo: &dyn CampusRepository, username: &str) -> Result<UserRow, ApiError> {
    repo.get_user_by_username(username.trim())
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| {
            ApiError::not_found("USER_NOT_FOUND", format!("User '{}' not found", username))
        })
}

/// User a write is attributed to
///
/// Sessions act as themselves; a body `username` that names someone else
/// is refused. With auth disabled the body `username` is required.
pub async fn resolve_acting_user(
    repo: &dyn CampusRepository,
    ctx: &AuthContext,
    body_username: Option<&str>,
) -> Result<i64, ApiError> {
    let body_username = non_empty(body_username);
    match ctx {
        AuthContext::Session {
            user_id, username, ..
        } => {
            if let Some(claimed) = body_username
                && !claimed.eq_ignore_ascii_case(username)
            {
                return Err(ApiError::forbidden(
                    "USERNAME_MISMATCH",
                    "Requests can only be made as the logged-in user",
                ));
            }
            Ok(*user_id)
        }
        AuthContext::LocalDefault => {
            let username = body_username.ok_or_else(|| {
                ApiError::bad_request("USERNAME_REQUIRED", "username is required")
            })?;
            Ok(resolve_user(repo, username).await?.id)
        }
    }
}

/// How a request refers to a location
#[derive(Debug, Clone, Default)]
pub struct LocationRef<'a> {
    pub location_id: Option<i64>,
    pub location: Option<&'a str>,
    pub university: Option<&'a str>,
    pub state: Option<&'a str>,
    pub campus: Option<&'a str>,
}

/// Resolve a location reference to exactly one location
///
/// An id wins over names. Names go through the candidate chain; the
/// first candidate with any match decides, and more than one match for
/// that candidate is a conflict.
pub async fn resolve_location(
    repo: &dyn CampusRepository,
    reference: &LocationRef<'_>,
) -> Result<LocationRow, ApiError> {
    if let Some(id) = reference.location_id {
        return repo
            .get_location(id)
            .await
            .map_err(ApiError::from_data)?
            .ok_or_else(|| {
                ApiError::not_found("LOCATION_NOT_FOUND", format!("Location {} not found", id))
            });
    }

    let (Some(name), Some(university)) = (
        non_empty(reference.location),
        non_empty(reference.university),
    ) else {
        return Err(ApiError::bad_request(
            "LOCATION_REQUIRED",
            "Pass location_id, or location together with university",
        ));
    };

    let university = resolve_university(repo, university, reference.state).await?;
    let campus = non_empty(reference.campus);

    for candidate in name_candidates(name) {
        let mut matches = match &candidate {
            NameCandidate::Name(n) => repo.find_locations_by_name(university.id, campus, n).await,
            NameCandidate::BuildingRoom {
                building,
                room_number,
            } => {
                repo.find_rooms_by_number(university.id, campus, building, room_number)
                    .await
            }
        }
        .map_err(ApiError::from_data)?;

        match matches.len() {
            0 => continue,
            1 => return Ok(matches.remove(0)),
            n => {
                tracing::debug!(?candidate, matches = n, "Ambiguous location reference");
                return Err(ApiError::conflict(
                    "AMBIGUOUS_LOCATION",
                    format!(
                        "'{}' matches {} locations at {}; pass location_id or campus",
                        name, n, university.name
                    ),
                ));
            }
        }
    }

    Err(ApiError::not_found(
        "LOCATION_NOT_FOUND",
        format!("Location '{}' not found at {}", name, university.name),
    ))
}
