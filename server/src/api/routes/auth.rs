//! Account endpoints: register, login, logout and session status

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::api::auth::AuthManager;
use crate::api::extractors::ValidatedJson;
use crate::api::routes::resolve::resolve_university;
use crate::api::types::{ApiError, MessageResponse};
use crate::core::constants::{MIN_PASSWORD_LENGTH, SESSION_COOKIE_NAME};
use crate::data::types::{UserRole, UserRow};
use crate::data::{DataError, TransactionalService};
use crate::utils::password::{hash_password, verify_password};

/// Verified when the username is unknown so both paths cost the same
const DUMMY_PASSWORD_HASH: &str = "$pbkdf2-sha256$i=100000,l=32$\
    AAAAAAAAAAAAAAAAAAAAAA$\
    AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.to_lowercase().contains("admin") {
        return Err(ValidationError::new("reserved_username")
            .with_message("Username cannot contain 'admin'".into()));
    }
    if username.trim() != username {
        return Err(ValidationError::new("username_whitespace")
            .with_message("Username cannot start or end with whitespace".into()));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(
        length(min = 3, max = 64, message = "Username must be 3-64 characters"),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[validate(length(
        min = MIN_PASSWORD_LENGTH,
        message = "Password must be at least 8 characters"
    ))]
    pub password: String,
    /// Home university name
    pub university: Option<String>,
    /// Narrows `university` when several share the name
    pub state: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username cannot be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

/// Public view of an account
#[derive(Debug, Serialize, ToSchema)]
pub struct UserDto {
    pub username: String,
    pub role: UserRole,
    pub university_id: Option<i64>,
}

impl From<&UserRow> for UserDto {
    fn from(user: &UserRow) -> Self {
        Self {
            username: user.username.clone(),
            role: user.role,
            university_id: user.university_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub auth_enabled: bool,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserDto>,
}

#[derive(Clone)]
pub struct AuthRoutesState {
    pub auth_manager: Arc<AuthManager>,
    pub database: Arc<TransactionalService>,
}

/// Create auth routes
pub fn routes(auth_manager: Arc<AuthManager>, database: Arc<TransactionalService>) -> Router {
    let state = AuthRoutesState {
        auth_manager,
        database,
    };

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/session", get(session_status))
        .with_state(state)
}

fn session_cookie(jwt: String, ttl_days: u32) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, jwt))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/api")
        .max_age(time::Duration::days(ttl_days as i64))
        .build()
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("INVALID_CREDENTIALS", "Invalid username or password")
}

/// Create a regular account
#[utoipa::path(
    post,
    path = "/api/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserDto),
        (status = 400, description = "Invalid username or password"),
        (status = 404, description = "University not found"),
        (status = 409, description = "Username taken")
    )
)]
pub async fn register(
    State(state): State<AuthRoutesState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    let repo = state.database.repository();

    let university_id = match request.university.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => {
            Some(resolve_university(&*repo, name, request.state.as_deref()).await?.id)
        }
        _ => None,
    };

    let password = request.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::internal(format!("Password hashing task failed: {}", e)))?
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let user = repo
        .create_user(&request.username, &password_hash, UserRole::User, university_id)
        .await
        .map_err(|e| match e {
            DataError::Conflict(_) => {
                ApiError::conflict("USERNAME_TAKEN", "Username is already taken")
            }
            other => ApiError::from_data(other),
        })?;

    tracing::debug!(user_id = user.id, "Registered user");
    Ok((StatusCode::CREATED, Json(UserDto::from(&user))))
}

/// Password login; sets the session cookie
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = UserDto),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AuthRoutesState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<UserDto>), ApiError> {
    let user = state
        .database
        .repository()
        .get_user_by_username(&request.username)
        .await
        .map_err(ApiError::from_data)?;

    let stored_hash = user
        .as_ref()
        .map(|u| u.password_hash.clone())
        .unwrap_or_else(|| DUMMY_PASSWORD_HASH.to_string());
    let password = request.password;
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| ApiError::internal(format!("Password verification task failed: {}", e)))?;

    let user = match (user, verified) {
        (Some(user), Ok(true)) => user,
        (Some(user), Err(e)) => {
            tracing::warn!(user_id = user.id, error = %e, "Stored password hash is unreadable");
            return Err(invalid_credentials());
        }
        _ => return Err(invalid_credentials()),
    };

    let jwt = state
        .auth_manager
        .create_session(user.id)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    let cookie = session_cookie(jwt, state.auth_manager.session_ttl_days());

    tracing::debug!(user_id = user.id, "User logged in");
    Ok((jar.add(cookie), Json(UserDto::from(&user))))
}

/// Report the current session
#[utoipa::path(
    get,
    path = "/api/session",
    tag = "auth",
    responses(
        (status = 200, description = "Session status", body = SessionResponse)
    )
)]
pub async fn session_status(
    State(state): State<AuthRoutesState>,
    jar: CookieJar,
) -> Json<SessionResponse> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let anonymous = SessionResponse {
        authenticated: false,
        auth_enabled: state.auth_manager.is_enabled(),
        version: VERSION,
        expires_at: None,
        user: None,
    };

    if !state.auth_manager.is_enabled() {
        return Json(SessionResponse {
            authenticated: true,
            ..anonymous
        });
    }

    let Some(cookie) = jar.get(SESSION_COOKIE_NAME) else {
        return Json(anonymous);
    };
    let Ok(claims) = state.auth_manager.validate_session(cookie.value()) else {
        return Json(anonymous);
    };
    let Some(user_id) = claims.user_id() else {
        return Json(anonymous);
    };

    match state.database.repository().get_user(user_id).await {
        Ok(Some(user)) => Json(SessionResponse {
            authenticated: true,
            expires_at: DateTime::from_timestamp(claims.exp, 0),
            user: Some(UserDto::from(&user)),
            ..anonymous
        }),
        Ok(None) => Json(anonymous),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load session user");
            Json(anonymous)
        }
    }
}

/// Logout - clear session cookie
#[utoipa::path(
    post,
    path = "/api/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out successfully", body = MessageResponse)
    )
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let cookie = Cookie::build((SESSION_COOKIE_NAME, ""))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/api")
        .max_age(time::Duration::seconds(0))
        .build();

    (
        jar.remove(cookie),
        Json(MessageResponse::new("Logged out successfully")),
    )
}
