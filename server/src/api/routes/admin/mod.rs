//! Admin API endpoints
//!
//! Every handler takes `AdminOnly`, so the router must sit behind
//! `require_auth`.

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::api::auth::AdminOnly;
use crate::api::extractors::{ValidatedJson, ValidatedPath, ValidatedQuery};
use crate::api::types::{ApiError, MessageResponse};
use crate::data::types::{RequestResolution, RequestStatus, UserRole};
use crate::data::{DataError, TransactionalService};

use super::requests::types::RoomRequestDto;
use super::resolve::university_by_id;
use super::universities::types::{CampusDto, UniversityDto};
use types::{
    AdminUserDto, BuildingCreatedResponse, CampusCreatedResponse, CreateNamedRequest,
    CreateUniversityRequest, RequestsQuery, ResolveResponse, UniversitiesResponse,
    UniversityCreatedResponse, UsersResponse,
};

/// Shared state for Admin API endpoints
#[derive(Clone)]
pub struct AdminApiState {
    pub database: Arc<TransactionalService>,
}

/// Build Admin API routes (mounted under `/admin`)
pub fn routes(database: Arc<TransactionalService>) -> Router<()> {
    let state = AdminApiState { database };

    Router::new()
        .route("/users", get(list_users))
        .route("/users/{username}/promote", post(promote_user))
        .route("/users/{username}/demote", post(demote_user))
        .route(
            "/universities",
            get(list_universities).post(create_university),
        )
        .route("/universities/{id}", delete(delete_university))
        .route(
            "/universities/{id}/campuses",
            get(list_campuses).post(create_campus),
        )
        .route(
            "/universities/{id}/campuses/{campus_id}/buildings",
            post(create_building),
        )
        .route("/requested-rooms", get(list_requests))
        .route("/requested-rooms/{id}/approve", post(approve_request))
        .route("/requested-rooms/{id}/reject", post(reject_request))
        .with_state(state)
}

// ==================== Users ====================

/// List all accounts
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "admin",
    responses(
        (status = 200, description = "All users", body = UsersResponse),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_users(
    State(state): State<AdminApiState>,
    _admin: AdminOnly,
) -> Result<Json<UsersResponse>, ApiError> {
    let users = state
        .database
        .repository()
        .list_users()
        .await
        .map_err(ApiError::from_data)?;

    Ok(Json(UsersResponse {
        users: users.into_iter().map(AdminUserDto::from).collect(),
    }))
}

async fn change_role(
    state: &AdminApiState,
    username: &str,
    role: UserRole,
) -> Result<Json<AdminUserDto>, ApiError> {
    let user = state
        .database
        .repository()
        .set_user_role(username, role)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| {
            ApiError::not_found("USER_NOT_FOUND", format!("User '{}' not found", username))
        })?;

    tracing::info!(username = %user.username, role = role.as_str(), "User role changed");
    Ok(Json(AdminUserDto::from(user)))
}

/// Grant the admin role
#[utoipa::path(
    post,
    path = "/api/admin/users/{username}/promote",
    tag = "admin",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "Updated user", body = AdminUserDto),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn promote_user(
    State(state): State<AdminApiState>,
    _admin: AdminOnly,
    ValidatedPath(username): ValidatedPath<String>,
) -> Result<Json<AdminUserDto>, ApiError> {
    change_role(&state, &username, UserRole::Admin).await
}

/// Revoke the admin role
#[utoipa::path(
    post,
    path = "/api/admin/users/{username}/demote",
    tag = "admin",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "Updated user", body = AdminUserDto),
        (status = 400, description = "Admins cannot demote themselves"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn demote_user(
    State(state): State<AdminApiState>,
    admin: AdminOnly,
    ValidatedPath(username): ValidatedPath<String>,
) -> Result<Json<AdminUserDto>, ApiError> {
    if admin
        .ctx
        .username()
        .is_some_and(|own| own.eq_ignore_ascii_case(&username))
    {
        return Err(ApiError::bad_request(
            "CANNOT_DEMOTE_SELF",
            "Admins cannot demote themselves",
        ));
    }
    change_role(&state, &username, UserRole::User).await
}

// ==================== Universities ====================

/// List all universities
#[utoipa::path(
    get,
    path = "/api/admin/universities",
    tag = "admin",
    responses(
        (status = 200, description = "All universities", body = UniversitiesResponse),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_universities(
    State(state): State<AdminApiState>,
    _admin: AdminOnly,
) -> Result<Json<UniversitiesResponse>, ApiError> {
    let universities = state
        .database
        .repository()
        .list_universities()
        .await
        .map_err(ApiError::from_data)?;

    Ok(Json(UniversitiesResponse {
        universities: universities.into_iter().map(UniversityDto::from).collect(),
    }))
}

/// Create a university unless `(name, state)` exists
#[utoipa::path(
    post,
    path = "/api/admin/universities",
    tag = "admin",
    request_body = CreateUniversityRequest,
    responses(
        (status = 201, description = "University created", body = UniversityCreatedResponse),
        (status = 200, description = "University already existed", body = UniversityCreatedResponse),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn create_university(
    State(state): State<AdminApiState>,
    _admin: AdminOnly,
    ValidatedJson(body): ValidatedJson<CreateUniversityRequest>,
) -> Result<(StatusCode, Json<UniversityCreatedResponse>), ApiError> {
    let wiki_url = body.wiki_url.as_deref().map(str::trim).filter(|u| !u.is_empty());
    let upserted = state
        .database
        .repository()
        .create_university(body.name.trim(), body.state.trim(), wiki_url)
        .await
        .map_err(ApiError::from_data)?;

    let created = upserted.was_created();
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(UniversityCreatedResponse {
            university: UniversityDto::from(upserted.into_inner()),
            created,
        }),
    ))
}

/// Delete a university without campuses
#[utoipa::path(
    delete,
    path = "/api/admin/universities/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "University id")),
    responses(
        (status = 200, description = "University deleted", body = MessageResponse),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "University not found"),
        (status = 409, description = "University still has campuses")
    )
)]
pub async fn delete_university(
    State(state): State<AdminApiState>,
    _admin: AdminOnly,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = state
        .database
        .repository()
        .delete_university(id)
        .await
        .map_err(|e| match e {
            DataError::Conflict(_) => ApiError::conflict(
                "UNIVERSITY_HAS_CAMPUSES",
                "Delete the university's campuses first",
            ),
            other => ApiError::from_data(other),
        })?;

    if !deleted {
        return Err(ApiError::not_found(
            "UNIVERSITY_NOT_FOUND",
            format!("University {} not found", id),
        ));
    }
    tracing::info!(university_id = id, "University deleted");
    Ok(Json(MessageResponse::new("University deleted")))
}

// ==================== Campuses & buildings ====================

/// Campuses of a university, by name
#[utoipa::path(
    get,
    path = "/api/admin/universities/{id}/campuses",
    tag = "admin",
    params(("id" = i64, Path, description = "University id")),
    responses(
        (status = 200, description = "Campuses", body = [CampusDto]),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "University not found")
    )
)]
pub async fn list_campuses(
    State(state): State<AdminApiState>,
    _admin: AdminOnly,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<Json<Vec<CampusDto>>, ApiError> {
    university_by_id(&*state.database.repository(), id).await?;
    let campuses = state
        .database
        .repository()
        .list_campuses(id)
        .await
        .map_err(ApiError::from_data)?;
    Ok(Json(campuses.into_iter().map(CampusDto::from).collect()))
}

/// Create a campus unless the name exists at this university
#[utoipa::path(
    post,
    path = "/api/admin/universities/{id}/campuses",
    tag = "admin",
    params(("id" = i64, Path, description = "University id")),
    request_body = CreateNamedRequest,
    responses(
        (status = 201, description = "Campus created", body = CampusCreatedResponse),
        (status = 200, description = "Campus already existed", body = CampusCreatedResponse),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "University not found")
    )
)]
pub async fn create_campus(
    State(state): State<AdminApiState>,
    _admin: AdminOnly,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(body): ValidatedJson<CreateNamedRequest>,
) -> Result<(StatusCode, Json<CampusCreatedResponse>), ApiError> {
    university_by_id(&*state.database.repository(), id).await?;
    let upserted = state
        .database
        .repository()
        .create_campus(id, body.name.trim())
        .await
        .map_err(ApiError::from_data)?;

    let created = upserted.was_created();
    let campus = upserted.into_inner();
    Ok((
        if created {
            StatusCode::CREATED
        } else {
            StatusCode::OK
        },
        Json(CampusCreatedResponse {
            id: campus.id,
            university_id: campus.university_id,
            name: campus.name,
            created,
        }),
    ))
}

/// Create a building unless the name exists on this campus
#[utoipa::path(
    post,
    path = "/api/admin/universities/{id}/campuses/{campus_id}/buildings",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "University id"),
        ("campus_id" = i64, Path, description = "Campus id")
    ),
    request_body = CreateNamedRequest,
    responses(
        (status = 201, description = "Building created", body = BuildingCreatedResponse),
        (status = 200, description = "Building already existed", body = BuildingCreatedResponse),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Campus not found at this university")
    )
)]
pub async fn create_building(
    State(state): State<AdminApiState>,
    _admin: AdminOnly,
    ValidatedPath((id, campus_id)): ValidatedPath<(i64, i64)>,
    ValidatedJson(body): ValidatedJson<CreateNamedRequest>,
) -> Result<(StatusCode, Json<BuildingCreatedResponse>), ApiError> {
    let repo = state.database.repository();

    repo.get_campus(campus_id)
        .await
        .map_err(ApiError::from_data)?
        .filter(|c| c.university_id == id)
        .ok_or_else(|| {
            ApiError::not_found(
                "CAMPUS_NOT_FOUND",
                format!("Campus {} not found at university {}", campus_id, id),
            )
        })?;

    let name = body.name.trim();
    let upserted = repo
        .create_building(id, campus_id, name)
        .await
        .map_err(ApiError::from_data)?;

    let created = upserted.was_created();
    Ok((
        if created {
            StatusCode::CREATED
        } else {
            StatusCode::OK
        },
        Json(BuildingCreatedResponse {
            location_id: upserted.into_inner(),
            campus_id,
            name: name.to_string(),
            created,
        }),
    ))
}

// ==================== Room requests ====================

/// Room requests, pending ones by default
#[utoipa::path(
    get,
    path = "/api/admin/requested-rooms",
    tag = "admin",
    params(("status" = Option<String>, Query, description = "pending (default), approved, rejected or all")),
    responses(
        (status = 200, description = "Room requests", body = [RoomRequestDto]),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_requests(
    State(state): State<AdminApiState>,
    _admin: AdminOnly,
    ValidatedQuery(query): ValidatedQuery<RequestsQuery>,
) -> Result<Json<Vec<RoomRequestDto>>, ApiError> {
    let status = query
        .status_filter()
        .map_err(|e| ApiError::bad_request("INVALID_STATUS", e))?;
    let requests = state
        .database
        .repository()
        .list_room_requests(status)
        .await
        .map_err(ApiError::from_data)?;
    Ok(Json(requests.into_iter().map(RoomRequestDto::from).collect()))
}

fn resolution_response(
    id: i64,
    target: RequestStatus,
    resolution: RequestResolution,
) -> Result<Json<ResolveResponse>, ApiError> {
    match resolution {
        RequestResolution::Resolved { location_id } => {
            tracing::info!(request_id = id, status = target.as_str(), ?location_id, "Room request resolved");
            Ok(Json(ResolveResponse {
                request_id: id,
                status: target,
                location_id,
            }))
        }
        RequestResolution::NotFound => Err(ApiError::not_found(
            "REQUEST_NOT_FOUND",
            format!("Room request {} not found", id),
        )),
        RequestResolution::AlreadyResolved(status) => Err(ApiError::conflict(
            "REQUEST_ALREADY_RESOLVED",
            format!("Room request {} is already {}", id, status.as_str()),
        )),
    }
}

fn map_resolution_error(e: DataError) -> ApiError {
    match e {
        DataError::Conflict(msg) => ApiError::conflict("LOCATION_CONFLICT", msg),
        other => ApiError::from_data(other),
    }
}

/// Approve a pending request, creating the location
#[utoipa::path(
    post,
    path = "/api/admin/requested-rooms/{id}/approve",
    tag = "admin",
    params(("id" = i64, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request approved", body = ResolveResponse),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not pending")
    )
)]
pub async fn approve_request(
    State(state): State<AdminApiState>,
    _admin: AdminOnly,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let resolution = state
        .database
        .repository()
        .approve_room_request(id)
        .await
        .map_err(map_resolution_error)?;
    resolution_response(id, RequestStatus::Approved, resolution)
}

/// Reject a pending request
#[utoipa::path(
    post,
    path = "/api/admin/requested-rooms/{id}/reject",
    tag = "admin",
    params(("id" = i64, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request rejected", body = ResolveResponse),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not pending")
    )
)]
pub async fn reject_request(
    State(state): State<AdminApiState>,
    _admin: AdminOnly,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let resolution = state
        .database
        .repository()
        .reject_room_request(id)
        .await
        .map_err(map_resolution_error)?;
    resolution_response(id, RequestStatus::Rejected, resolution)
}
