//! University API endpoints: search and detail view

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::extractors::ValidatedQuery;
use crate::api::types::ApiError;
use crate::core::constants::SEARCH_RESULT_LIMIT;
use crate::data::TransactionalService;
use crate::domain::location::list_display_locations;

use types::{
    CampusDto, ListedLocationDto, SearchQuery, SearchResponse, UniversityDetailResponse,
    UniversityDto, UniversityQuery, UniversitySummaryDto,
};

/// Shared state for University API endpoints
#[derive(Clone)]
pub struct UniversitiesApiState {
    pub database: Arc<TransactionalService>,
}

/// Build University API routes
pub fn routes(database: Arc<TransactionalService>) -> Router<()> {
    let state = UniversitiesApiState { database };

    Router::new()
        .route("/search", get(search_universities))
        .route("/university", get(get_university))
        .with_state(state)
}

/// Search universities by name and state
#[utoipa::path(
    get,
    path = "/api/search",
    tag = "universities",
    params(
        ("q" = Option<String>, Query, description = "Substring of the university name"),
        ("state" = Option<String>, Query, description = "Exact state code")
    ),
    responses(
        (status = 200, description = "Matching universities", body = SearchResponse)
    )
)]
pub async fn search_universities(
    State(state): State<UniversitiesApiState>,
    ValidatedQuery(query): ValidatedQuery<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let q = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let st = query
        .state
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let results = state
        .database
        .repository()
        .search_universities(q, st, SEARCH_RESULT_LIMIT)
        .await
        .map_err(ApiError::from_data)?;

    Ok(Json(SearchResponse {
        results: results.into_iter().map(UniversitySummaryDto::from).collect(),
    }))
}

/// University with its campuses and listed locations
#[utoipa::path(
    get,
    path = "/api/university",
    tag = "universities",
    params(
        ("name" = String, Query, description = "Exact university name"),
        ("state" = String, Query, description = "Exact state code")
    ),
    responses(
        (status = 200, description = "University detail", body = UniversityDetailResponse),
        (status = 404, description = "University not found")
    )
)]
pub async fn get_university(
    State(state): State<UniversitiesApiState>,
    ValidatedQuery(query): ValidatedQuery<UniversityQuery>,
) -> Result<Json<UniversityDetailResponse>, ApiError> {
    let repo = state.database.repository();

    let university = repo
        .find_university(query.name.trim(), query.state.trim())
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| {
            ApiError::not_found(
                "UNIVERSITY_NOT_FOUND",
                format!("University '{}' ({}) not found", query.name, query.state),
            )
        })?;

    let campuses = repo
        .list_campuses(university.id)
        .await
        .map_err(ApiError::from_data)?;
    let locations = repo
        .list_locations(university.id)
        .await
        .map_err(ApiError::from_data)?;

    Ok(Json(UniversityDetailResponse {
        university: UniversityDto::from(university),
        campuses: campuses.into_iter().map(CampusDto::from).collect(),
        locations: list_display_locations(&locations)
            .into_iter()
            .map(ListedLocationDto::from)
            .collect(),
    }))
}
