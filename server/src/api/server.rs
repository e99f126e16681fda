//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::auth::{AuthManager, AuthState, require_auth};
use super::middleware::{self, AllowedOrigins};
use super::openapi::{openapi_json, swagger_ui_html};
use super::routes::{
    admin, auth, health, locations, ratings, requests, tags, universities,
};
use crate::core::CoreApp;
use crate::core::constants::DEFAULT_BODY_LIMIT;
use crate::data::TransactionalService;

pub struct ApiServer {
    app: CoreApp,
    allowed_origins: AllowedOrigins,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        let allowed_origins = AllowedOrigins::new(&app.config.server.host, app.config.server.port);
        Self {
            app,
            allowed_origins,
        }
    }

    /// Serve until shutdown; returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self {
            app,
            allowed_origins,
        } = self;

        let shutdown = app.shutdown.clone();
        let addr = SocketAddr::new(app.config.server.host.parse()?, app.config.server.port);

        let router = build_router(
            app.database.clone(),
            app.auth.clone(),
            allowed_origins,
            app.config.search.location_limit,
        );

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, auth = app.auth.is_enabled(), "API server listening");
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.wait())
        .await?;

        Ok(app)
    }
}

/// Assemble the full `/api` router
///
/// Public reads and account endpoints are open; review, room request and
/// admin endpoints run behind `require_auth`.
pub fn build_router(
    database: Arc<TransactionalService>,
    auth_manager: Arc<AuthManager>,
    allowed_origins: AllowedOrigins,
    location_limit: i64,
) -> Router {
    let public_routes = Router::new()
        .merge(auth::routes(auth_manager.clone(), database.clone()))
        .merge(universities::routes(database.clone()))
        .merge(locations::routes(database.clone(), location_limit))
        .merge(ratings::routes(database.clone()));

    let protected_routes = Router::new()
        .merge(ratings::protected_routes(database.clone()))
        .merge(requests::protected_routes(database.clone()))
        .nest("/admin", admin::routes(database.clone()))
        .layer(axum::middleware::from_fn_with_state(
            AuthState {
                auth_manager,
                allowed_origins: allowed_origins.clone(),
                database,
            },
            require_auth,
        ));

    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/equipmentTags", get(tags::equipment_tags))
        .route("/api/accessibilityTags", get(tags::accessibility_tags))
        .route("/api/openapi.json", get(openapi_json))
        .route("/api/docs", get(swagger_ui_html))
        .route("/api/docs/", get(swagger_ui_html))
        .nest("/api", public_routes.merge(protected_routes))
        .fallback(middleware::handle_404)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(middleware::cors(&allowed_origins))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::data::{CampusRepository, SqliteService};
    use crate::data::sqlite::repositories::location::insert_room;
    use crate::data::types::{NewRoom, RoomSize, RoomType, UserRole};
    use crate::utils::password::hash_password_with;

    struct Harness {
        router: Router,
        service: Arc<SqliteService>,
        university_id: i64,
    }

    async fn harness() -> Harness {
        let service = Arc::new(SqliteService::open_in_memory().await.unwrap());
        let database = Arc::new(TransactionalService::Sqlite(service.clone()));

        let uni = service
            .create_university("University of Southern Maine", "ME", None)
            .await
            .unwrap()
            .into_inner();
        let portland = service
            .create_campus(uni.id, "Portland")
            .await
            .unwrap()
            .into_inner();
        let gorham = service.create_campus(uni.id, "Gorham").await.unwrap().into_inner();

        let rooms = [
            (&gorham, "Bailey Hall", "Bailey 101", "101", RoomType::Classroom, RoomSize::Small),
            (&gorham, "Bailey Hall", "Bailey 202", "202", RoomType::Lab, RoomSize::Medium),
            (&portland, "Luther Bonney", "Bonney 110", "110", RoomType::Classroom, RoomSize::Large),
        ];
        for (campus, building, name, number, room_type, room_size) in rooms {
            let building_id = service
                .create_building(uni.id, campus.id, building)
                .await
                .unwrap()
                .into_inner();
            let mut conn = service.pool().acquire().await.unwrap();
            insert_room(
                &mut *conn,
                &NewRoom {
                    university_id: uni.id,
                    campus_id: campus.id,
                    building_id,
                    name: name.to_string(),
                    room_number: Some(number.to_string()),
                    room_type,
                    room_size,
                    floor: None,
                    capacity: None,
                    image_url: None,
                    attributes: vec![],
                },
            )
            .await
            .unwrap();
        }

        for (username, role) in [("casey", UserRole::User), ("root", UserRole::Admin)] {
            let hash = hash_password_with("correct horse", 10).unwrap();
            service.create_user(username, &hash, role, None).await.unwrap();
        }

        let router = build_router(
            database,
            Arc::new(AuthManager::new(vec![7; 32], true, 30)),
            AllowedOrigins::new("127.0.0.1", 5055),
            200,
        );

        Harness {
            router,
            service,
            university_id: uni.id,
        }
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::get(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post(uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn login(router: &Router, username: &str) -> String {
        let response = router
            .clone()
            .oneshot(post(
                "/api/login",
                None,
                json!({"username": username, "password": "correct horse"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_university_detail() {
        let h = harness().await;

        let (status, body) = send(
            &h.router,
            get("/api/university?name=University%20of%20Southern%20Maine&state=ME", None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let campuses: Vec<&str> = body["campuses"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(campuses, vec!["Gorham", "Portland"]);

        let (status, body) = send(&h.router, get("/api/university?name=Nowhere&state=ME", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "UNIVERSITY_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_add_review_requires_session() {
        let h = harness().await;
        let (status, body) = send(
            &h.router,
            post("/api/addReview", None, json!({"location_id": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "AUTH_REQUIRED");
    }

    #[tokio::test]
    async fn test_add_review_stores_rating_and_tags() {
        let h = harness().await;
        let cookie = login(&h.router, "casey").await;

        let (status, body) = send(
            &h.router,
            post(
                "/api/addReview",
                Some(&cookie),
                json!({
                    "location": "Bailey Hall - Room 101",
                    "university": "University of Southern Maine",
                    "campus": "Gorham",
                    "score": 8,
                    "noise": 2,
                    "cleanliness": 4,
                    "equipment_quality": 3,
                    "wifi_strength": 2,
                    "comment": "Quiet in the mornings",
                    "equipment_tags": ["projector", "whiteboard"],
                    "accessibility_tags": ["elevator access"]
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["rating"]["username"], "casey");

        let tag_rows: i64 = sqlx::query_scalar(
            "SELECT (SELECT COUNT(*) FROM rating_equipment) + (SELECT COUNT(*) FROM rating_accessibility)",
        )
        .fetch_one(h.service.pool())
        .await
        .unwrap();
        assert_eq!(tag_rows, 3);
    }

    #[tokio::test]
    async fn test_add_review_missing_field_writes_nothing() {
        let h = harness().await;
        let cookie = login(&h.router, "casey").await;

        let (status, _) = send(
            &h.router,
            post(
                "/api/addReview",
                Some(&cookie),
                json!({
                    "location_id": 1,
                    "score": 8,
                    "noise": 2,
                    "cleanliness": 4,
                    "equipment_quality": 3
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let ratings: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ratings")
            .fetch_one(h.service.pool())
            .await
            .unwrap();
        assert_eq!(ratings, 0);
    }

    #[tokio::test]
    async fn test_location_search_filters() {
        let h = harness().await;
        let base = format!("/api/locationSearch?university_id={}", h.university_id);

        let (status, body) = send(&h.router, get(&format!("{base}&room_size=small,medium"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"].as_array().unwrap().len(), 2);

        let (_, body) = send(
            &h.router,
            get(&format!("{base}&campus=Gorham&room_type=lab"), None),
        )
        .await;
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["db_location_name"], "Bailey 202");

        let (status, body) = send(&h.router, get(&format!("{base}&room_size=huge"), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_FILTER");
    }

    #[tokio::test]
    async fn test_admin_routes_require_admin_role() {
        let h = harness().await;

        let cookie = login(&h.router, "casey").await;
        let (status, body) = send(&h.router, get("/api/admin/users", Some(&cookie))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "ADMIN_REQUIRED");

        let cookie = login(&h.router, "root").await;
        let (status, body) = send(&h.router, get("/api/admin/users", Some(&cookie))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["users"].as_array().unwrap().len(), 2);

        let (status, body) = send(
            &h.router,
            post("/api/admin/users/root/demote", Some(&cookie), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "CANNOT_DEMOTE_SELF");
    }

    #[tokio::test]
    async fn test_room_request_approval_flow() {
        let h = harness().await;
        let cookie = login(&h.router, "casey").await;

        let (status, body) = send(
            &h.router,
            post(
                "/api/request-room",
                Some(&cookie),
                json!({
                    "room_name": "Bailey 303",
                    "university_name": "University of Southern Maine",
                    "state": "ME",
                    "campus_name": "Gorham",
                    "building_name": "Bailey Hall",
                    "location_type": "room"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let request_id = body["request_id"].as_i64().unwrap();

        let admin = login(&h.router, "root").await;
        let (status, body) = send(&h.router, get("/api/admin/requested-rooms", Some(&admin))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let approve = format!("/api/admin/requested-rooms/{request_id}/approve");
        let (status, body) = send(&h.router, post(&approve, Some(&admin), json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "approved");
        assert!(body["location_id"].is_i64());

        let (status, body) = send(&h.router, post(&approve, Some(&admin), json!({}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "REQUEST_ALREADY_RESOLVED");
    }

    #[tokio::test]
    async fn test_blank_names_are_validation_errors() {
        let h = harness().await;
        let admin = login(&h.router, "root").await;

        let (status, body) = send(
            &h.router,
            post(
                "/api/admin/universities",
                Some(&admin),
                json!({"name": "   ", "state": "ME"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let campuses = format!("/api/admin/universities/{}/campuses", h.university_id);
        let (status, body) = send(&h.router, post(&campuses, Some(&admin), json!({"name": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let cookie = login(&h.router, "casey").await;
        let (status, body) = send(
            &h.router,
            post(
                "/api/request-room",
                Some(&cookie),
                json!({
                    "room_name": "   ",
                    "university_name": "University of Southern Maine",
                    "state": "ME",
                    "campus_name": "Gorham",
                    "location_type": "nonbuilding"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let universities: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM university")
            .fetch_one(h.service.pool())
            .await
            .unwrap();
        assert_eq!(universities, 1);
        let requests: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM room_requests")
            .fetch_one(h.service.pool())
            .await
            .unwrap();
        assert_eq!(requests, 0);
    }

    #[tokio::test]
    async fn test_location_search_unknown_university_id() {
        let h = harness().await;
        let uri = format!("/api/locationSearch?university_id={}", h.university_id + 100);
        let (status, body) = send(&h.router, get(&uri, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "UNIVERSITY_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let h = harness().await;
        let (status, body) = send(&h.router, get("/api/nope", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "ROUTE_NOT_FOUND");
    }
}
