//! Rating API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::auth::Authenticated;
use crate::api::extractors::{ValidatedJson, ValidatedQuery};
use crate::api::routes::resolve::{
    LocationRef, resolve_acting_user, resolve_location, resolve_university,
};
use crate::api::types::ApiError;
use crate::data::types::{LocationKind, NewRating, ReviewFilter};
use crate::data::TransactionalService;

use types::{
    AddReviewRequest, AddReviewResponse, LocationInfoDto, LocationRatingsQuery,
    LocationRatingsResponse, RatingDto, RatingSummaryDto, ReviewsQuery, ReviewsResponse,
};

/// Shared state for Rating API endpoints
#[derive(Clone)]
pub struct RatingsApiState {
    pub database: Arc<TransactionalService>,
}

/// Public read routes
pub fn routes(database: Arc<TransactionalService>) -> Router<()> {
    let state = RatingsApiState { database };

    Router::new()
        .route("/locationRatings", get(location_ratings))
        .route("/reviews", get(recent_reviews))
        .with_state(state)
}

/// Routes that need `require_auth`
pub fn protected_routes(database: Arc<TransactionalService>) -> Router<()> {
    let state = RatingsApiState { database };

    Router::new()
        .route("/addReview", post(add_review))
        .with_state(state)
}

/// Submit a rating for a location
#[utoipa::path(
    post,
    path = "/api/addReview",
    tag = "ratings",
    request_body = AddReviewRequest,
    responses(
        (status = 201, description = "Rating stored", body = AddReviewResponse),
        (status = 400, description = "Missing or out-of-range field, or unknown tag"),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "username differs from the session user"),
        (status = 404, description = "Location, university or user not found"),
        (status = 409, description = "Location name matches several locations")
    )
)]
pub async fn add_review(
    State(state): State<RatingsApiState>,
    auth: Authenticated,
    ValidatedJson(body): ValidatedJson<AddReviewRequest>,
) -> Result<(StatusCode, Json<AddReviewResponse>), ApiError> {
    let repo = state.database.repository();

    let equipment_tags = body.equipment()?;
    let accessibility_tags = body.accessibility()?;
    let user_id = resolve_acting_user(&*repo, &auth.ctx, body.username.as_deref()).await?;

    let location = resolve_location(
        &*repo,
        &LocationRef {
            location_id: body.location_id,
            location: body.location.as_deref(),
            university: body.university.as_deref(),
            state: body.state.as_deref(),
            campus: body.campus.as_deref(),
        },
    )
    .await?;

    let rating = NewRating {
        user_id,
        location_id: location.id,
        score: body.score,
        noise: body.noise,
        cleanliness: body.cleanliness,
        equipment_quality: body.equipment_quality,
        wifi_strength: body.wifi_strength,
        comment: body.trimmed_comment(),
        equipment_tags,
        accessibility_tags,
    };
    let rating_id = repo
        .create_rating(&rating)
        .await
        .map_err(ApiError::from_data)?;
    let stored = repo
        .get_rating(rating_id)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| ApiError::internal("Stored rating could not be read back"))?;

    tracing::debug!(rating_id, location_id = location.id, user_id, "Rating created");
    Ok((
        StatusCode::CREATED,
        Json(AddReviewResponse {
            message: "Review added".to_string(),
            rating: RatingDto::from(stored),
        }),
    ))
}

/// Ratings of one location, newest first
#[utoipa::path(
    get,
    path = "/api/locationRatings",
    tag = "ratings",
    params(
        ("location_id" = Option<i64>, Query, description = "Location id"),
        ("location" = Option<String>, Query, description = "Location name or display name"),
        ("university" = Option<String>, Query, description = "University name"),
        ("state" = Option<String>, Query, description = "University state"),
        ("campus" = Option<String>, Query, description = "Campus name")
    ),
    responses(
        (status = 200, description = "Location with its ratings", body = LocationRatingsResponse),
        (status = 404, description = "Location not found"),
        (status = 409, description = "Location name matches several locations")
    )
)]
pub async fn location_ratings(
    State(state): State<RatingsApiState>,
    ValidatedQuery(query): ValidatedQuery<LocationRatingsQuery>,
) -> Result<Json<LocationRatingsResponse>, ApiError> {
    let repo = state.database.repository();

    let location = resolve_location(
        &*repo,
        &LocationRef {
            location_id: query.location_id,
            location: query.location.as_deref(),
            university: query.university.as_deref(),
            state: query.state.as_deref(),
            campus: query.campus.as_deref(),
        },
    )
    .await?;

    let attributes = if location.kind == LocationKind::Room {
        repo.room_attributes(location.id)
            .await
            .map_err(ApiError::from_data)?
    } else {
        Vec::new()
    };
    let ratings = repo
        .list_ratings_for_location(location.id)
        .await
        .map_err(ApiError::from_data)?;
    let summary = repo
        .rating_summary(location.id)
        .await
        .map_err(ApiError::from_data)?;

    Ok(Json(LocationRatingsResponse {
        location: LocationInfoDto::new(location, attributes),
        summary: RatingSummaryDto::from(summary),
        ratings: ratings.into_iter().map(RatingDto::from).collect(),
    }))
}

/// Recent ratings across locations
#[utoipa::path(
    get,
    path = "/api/reviews",
    tag = "ratings",
    params(
        ("username" = Option<String>, Query, description = "Only this reviewer"),
        ("university" = Option<String>, Query, description = "Only locations of this university"),
        ("state" = Option<String>, Query, description = "University state"),
        ("limit" = Option<i64>, Query, description = "Page size (1-200, default 50)")
    ),
    responses(
        (status = 200, description = "Recent ratings", body = ReviewsResponse),
        (status = 400, description = "Invalid limit"),
        (status = 404, description = "University not found")
    )
)]
pub async fn recent_reviews(
    State(state): State<RatingsApiState>,
    ValidatedQuery(query): ValidatedQuery<ReviewsQuery>,
) -> Result<Json<ReviewsResponse>, ApiError> {
    let repo = state.database.repository();

    let university_id = match query.university.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => {
            Some(resolve_university(&*repo, name, query.state.as_deref()).await?.id)
        }
        _ => None,
    };
    let filter = ReviewFilter {
        username: query
            .username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string),
        university_id,
        limit: query.limit,
    };

    let reviews = repo
        .list_recent_ratings(&filter)
        .await
        .map_err(ApiError::from_data)?;

    Ok(Json(ReviewsResponse {
        reviews: reviews.into_iter().map(RatingDto::from).collect(),
    }))
}
