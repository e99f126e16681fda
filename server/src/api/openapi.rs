//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{
    admin, auth, health, locations, ratings, requests, tags, universities,
};
use crate::api::types::MessageResponse;
use crate::data::types::{LocationKind, RequestStatus, RoomSize, RoomType, UserRole};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Campus Insider API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Reviews of campus study spaces, buildings and rooms"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "auth", description = "Accounts and sessions"),
        (name = "tags", description = "Equipment and accessibility vocabularies"),
        (name = "universities", description = "University search and detail"),
        (name = "locations", description = "Location search"),
        (name = "ratings", description = "Reviews"),
        (name = "requests", description = "Room requests"),
        (name = "admin", description = "Administration")
    ),
    paths(
        // Health
        health::health,
        // Auth
        auth::register,
        auth::login,
        auth::logout,
        auth::session_status,
        // Tags
        tags::equipment_tags,
        tags::accessibility_tags,
        // Universities
        universities::search_universities,
        universities::get_university,
        // Locations
        locations::search_locations,
        // Ratings
        ratings::add_review,
        ratings::location_ratings,
        ratings::recent_reviews,
        // Room requests
        requests::request_room,
        // Admin
        admin::list_users,
        admin::promote_user,
        admin::demote_user,
        admin::list_universities,
        admin::create_university,
        admin::delete_university,
        admin::list_campuses,
        admin::create_campus,
        admin::create_building,
        admin::list_requests,
        admin::approve_request,
        admin::reject_request,
    ),
    components(schemas(
        MessageResponse,
        LocationKind,
        RoomType,
        RoomSize,
        UserRole,
        RequestStatus,
        health::HealthResponse,
        tags::TagsResponse,
        // Auth
        auth::RegisterRequest,
        auth::LoginRequest,
        auth::UserDto,
        auth::SessionResponse,
        // Universities
        universities::types::UniversitySummaryDto,
        universities::types::SearchResponse,
        universities::types::UniversityDto,
        universities::types::CampusDto,
        universities::types::ListedLocationDto,
        universities::types::UniversityDetailResponse,
        // Locations
        locations::types::LocationDto,
        locations::types::LocationSearchResponse,
        // Ratings
        ratings::types::AddReviewRequest,
        ratings::types::RatingDto,
        ratings::types::AddReviewResponse,
        ratings::types::LocationInfoDto,
        ratings::types::RatingSummaryDto,
        ratings::types::LocationRatingsResponse,
        ratings::types::ReviewsResponse,
        // Room requests
        requests::types::RoomRequestBody,
        requests::types::RoomRequestResponse,
        requests::types::RoomRequestDto,
        // Admin
        admin::types::AdminUserDto,
        admin::types::UsersResponse,
        admin::types::CreateUniversityRequest,
        admin::types::CreateNamedRequest,
        admin::types::UniversityCreatedResponse,
        admin::types::UniversitiesResponse,
        admin::types::CampusCreatedResponse,
        admin::types::BuildingCreatedResponse,
        admin::types::ResolveResponse,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Campus Insider API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        html { box-sizing: border-box; overflow-y: scroll; }
        *, *:before, *:after { box-sizing: inherit; }
        body { margin: 0; background: #fafafa; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: "/api/openapi.json",
                dom_id: '#swagger-ui',
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout",
                deepLinking: true,
                showExtensions: true,
                showCommonExtensions: true
            });
        };
    </script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_public_and_admin_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/search",
            "/api/locationSearch",
            "/api/addReview",
            "/api/request-room",
            "/api/admin/requested-rooms/{id}/approve",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
