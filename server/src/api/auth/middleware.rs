//! Authentication middleware

use std::sync::Arc;

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use serde_json::json;

use super::context::AuthContext;
use super::jwt::JwtError;
use super::manager::AuthManager;
use crate::api::middleware::{AllowedOrigins, origin_from_referer};
use crate::core::constants::SESSION_COOKIE_NAME;
use crate::data::TransactionalService;

/// Authentication error response
#[derive(Debug)]
pub struct AuthError {
    pub status: StatusCode,
    pub error: &'static str,
    pub code: &'static str,
    pub message: String,
}

impl AuthError {
    pub fn required() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "unauthorized",
            code: "AUTH_REQUIRED",
            message: "Authentication required".to_string(),
        }
    }

    pub fn expired() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "unauthorized",
            code: "TOKEN_EXPIRED",
            message: "Session has expired".to_string(),
        }
    }

    pub fn invalid() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "unauthorized",
            code: "TOKEN_INVALID",
            message: "Invalid session token".to_string(),
        }
    }

    pub fn origin_not_allowed() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "unauthorized",
            code: "ORIGIN_NOT_ALLOWED",
            message: "Request origin not allowed".to_string(),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: "internal_error",
            code: "INTERNAL",
            message: "Database operation failed".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.error,
            "code": self.code,
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

/// Shared auth state for middleware
#[derive(Clone)]
pub struct AuthState {
    pub auth_manager: Arc<AuthManager>,
    pub allowed_origins: AllowedOrigins,
    /// Users are reloaded on every request so role changes apply at once
    pub database: Arc<TransactionalService>,
}

/// Authentication middleware
///
/// Validates the session cookie, reloads the user and injects an
/// `AuthContext` into the request extensions. With auth disabled every
/// request gets `AuthContext::LocalDefault`.
pub async fn require_auth(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if !state.auth_manager.is_enabled() {
        request.extensions_mut().insert(AuthContext::LocalDefault);
        return Ok(next.run(request).await);
    }

    // Origin check for CSRF protection (with Referer fallback)
    let origin_to_check = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .or_else(|| {
            request
                .headers()
                .get(header::REFERER)
                .and_then(|v| v.to_str().ok())
                .and_then(|referer| {
                    let origin = origin_from_referer(referer);
                    if origin.is_none() {
                        tracing::debug!(referer = %referer, "Failed to parse Referer URL");
                    }
                    origin
                })
        });

    if let Some(origin_str) = origin_to_check
        && !state.allowed_origins.is_allowed(&origin_str)
    {
        tracing::warn!("Rejected request from disallowed origin: {}", origin_str);
        return Err(AuthError::origin_not_allowed());
    }

    let session_cookie = jar
        .get(SESSION_COOKIE_NAME)
        .ok_or_else(AuthError::required)?;

    let claims = state
        .auth_manager
        .validate_session(session_cookie.value())
        .map_err(|e| match e {
            JwtError::Expired => AuthError::expired(),
            _ => AuthError::invalid(),
        })?;
    let user_id = claims.user_id().ok_or_else(AuthError::invalid)?;

    let user = state
        .database
        .repository()
        .get_user(user_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id, "Failed to load session user");
            AuthError::unavailable()
        })?
        .ok_or_else(|| {
            tracing::debug!(user_id, "Session user no longer exists");
            AuthError::invalid()
        })?;

    request
        .extensions_mut()
        .insert(AuthContext::from_user(&user));

    Ok(next.run(request).await)
}
