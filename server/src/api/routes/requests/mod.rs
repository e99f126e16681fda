//! Room request submission

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::auth::Authenticated;
use crate::api::extractors::ValidatedJson;
use crate::api::routes::resolve::{resolve_acting_user, resolve_university};
use crate::api::types::ApiError;
use crate::data::TransactionalService;
use crate::data::types::{LocationKind, NewRoomRequest};

use types::{RoomRequestBody, RoomRequestResponse};

/// Shared state for the room request endpoint
#[derive(Clone)]
pub struct RequestsApiState {
    pub database: Arc<TransactionalService>,
}

/// Routes that need `require_auth`
pub fn protected_routes(database: Arc<TransactionalService>) -> Router<()> {
    let state = RequestsApiState { database };

    Router::new()
        .route("/request-room", post(request_room))
        .with_state(state)
}

/// Ask admins to add a missing location
#[utoipa::path(
    post,
    path = "/api/request-room",
    tag = "requests",
    request_body = RoomRequestBody,
    responses(
        (status = 201, description = "Request recorded", body = RoomRequestResponse),
        (status = 400, description = "Invalid body, or a room without building_name"),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "University, campus or building not found")
    )
)]
pub async fn request_room(
    State(state): State<RequestsApiState>,
    auth: Authenticated,
    ValidatedJson(body): ValidatedJson<RoomRequestBody>,
) -> Result<(StatusCode, Json<RoomRequestResponse>), ApiError> {
    let repo = state.database.repository();

    let location_kind: LocationKind = body
        .location_type
        .parse()
        .map_err(|e| ApiError::bad_request("INVALID_LOCATION_TYPE", format!("{}", e)))?;
    let requested_by = resolve_acting_user(&*repo, &auth.ctx, body.username.as_deref()).await?;

    let university = resolve_university(&*repo, &body.university_name, Some(&body.state)).await?;
    let campus_name = body.campus_name.trim();
    let campus = repo
        .find_campus(university.id, campus_name)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| {
            ApiError::not_found(
                "CAMPUS_NOT_FOUND",
                format!("Campus '{}' not found at {}", campus_name, university.name),
            )
        })?;

    let building_id = if location_kind == LocationKind::Room {
        let building_name = body
            .building_name
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .ok_or_else(|| {
                ApiError::bad_request("BUILDING_REQUIRED", "Room requests need building_name")
            })?;
        let id = repo
            .find_building(campus.id, building_name)
            .await
            .map_err(ApiError::from_data)?
            .ok_or_else(|| {
                ApiError::not_found(
                    "BUILDING_NOT_FOUND",
                    format!("Building '{}' not found on {}", building_name, campus.name),
                )
            })?;
        Some(id)
    } else {
        None
    };

    let request_id = repo
        .create_room_request(&NewRoomRequest {
            room_name: body.room_name.trim().to_string(),
            location_kind,
            requested_by,
            university_id: university.id,
            campus_id: campus.id,
            building_id,
        })
        .await
        .map_err(ApiError::from_data)?;

    tracing::debug!(request_id, requested_by, "Room request created");
    Ok((
        StatusCode::CREATED,
        Json(RoomRequestResponse {
            message: "Request submitted".to_string(),
            request_id,
        }),
    ))
}
