//! Location search endpoint

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::extractors::ValidatedQuery;
use crate::api::routes::resolve::{resolve_university, university_by_id};
use crate::api::types::ApiError;
use crate::data::TransactionalService;

use types::{LocationDto, LocationSearchQuery, LocationSearchResponse};

/// Shared state for the location search endpoint
#[derive(Clone)]
pub struct LocationsApiState {
    pub database: Arc<TransactionalService>,
    /// Result cap for `/api/locationSearch`
    pub search_limit: i64,
}

/// Build location routes
pub fn routes(database: Arc<TransactionalService>, search_limit: i64) -> Router<()> {
    let state = LocationsApiState {
        database,
        search_limit,
    };

    Router::new()
        .route("/locationSearch", get(search_locations))
        .with_state(state)
}

/// Filtered location search within one university
///
/// Filter categories combine with AND; comma separated values inside one
/// category combine with OR. Rating ranges must all hold on the same rating.
#[utoipa::path(
    get,
    path = "/api/locationSearch",
    tag = "locations",
    params(
        ("university_id" = Option<i64>, Query, description = "University id (or pass university + state)"),
        ("university" = Option<String>, Query, description = "University name"),
        ("state" = Option<String>, Query, description = "University state"),
        ("q" = Option<String>, Query, description = "Substring of the location name"),
        ("campus" = Option<String>, Query, description = "Campus name"),
        ("building" = Option<String>, Query, description = "Parent building name"),
        ("room_number" = Option<String>, Query, description = "Exact room number"),
        ("location_type" = Option<String>, Query, description = "building,nonbuilding,room"),
        ("room_size" = Option<String>, Query, description = "small,medium,large"),
        ("room_type" = Option<String>, Query, description = "classroom,study_room,lab,lecture_hall,other"),
        ("equipment_tags" = Option<String>, Query, description = "Comma separated equipment tags"),
        ("accessibility_tags" = Option<String>, Query, description = "Comma separated accessibility tags"),
        ("min_score" = Option<i64>, Query, description = "Lower score bound"),
        ("max_score" = Option<i64>, Query, description = "Upper score bound")
    ),
    responses(
        (status = 200, description = "Matching locations", body = LocationSearchResponse),
        (status = 400, description = "Invalid filter"),
        (status = 404, description = "University not found")
    )
)]
pub async fn search_locations(
    State(state): State<LocationsApiState>,
    ValidatedQuery(query): ValidatedQuery<LocationSearchQuery>,
) -> Result<Json<LocationSearchResponse>, ApiError> {
    let repo = state.database.repository();

    let university_id = match (query.university_id, query.university.as_deref()) {
        (Some(id), _) => university_by_id(&*repo, id).await?.id,
        (None, Some(name)) if !name.trim().is_empty() => {
            resolve_university(&*repo, name, query.state.as_deref())
                .await?
                .id
        }
        _ => {
            return Err(ApiError::bad_request(
                "UNIVERSITY_REQUIRED",
                "Pass university_id, or university with state",
            ));
        }
    };

    let params = query.to_params(university_id, state.search_limit)?;
    let rows = repo
        .search_locations(&params)
        .await
        .map_err(ApiError::from_data)?;

    tracing::debug!(university_id, results = rows.len(), "Location search");
    Ok(Json(LocationSearchResponse {
        university_id,
        results: rows.into_iter().map(LocationDto::from).collect(),
    }))
}
