//! Authorization extractors for Axum handlers
//!
//! Both read the `AuthContext` that `require_auth` placed in the request
//! extensions, so they only work on routes behind that middleware.
//!
//! ```no_run
//! # use campus_insider_server::api::auth::AdminOnly;
//! # use campus_insider_server::api::types::ApiError;
//! pub async fn list_users(admin: AdminOnly) -> Result<(), ApiError> {
//!     let _ctx = admin.ctx;
//!     Ok(())
//! }
//! ```

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use super::context::AuthContext;
use crate::api::types::ApiError;

/// Rejection type for auth extractors
pub enum AuthRejection {
    /// Authorization failed
    Auth(ApiError),
    /// Auth context not available (middleware not applied)
    MissingContext,
}

impl From<ApiError> for AuthRejection {
    fn from(e: ApiError) -> Self {
        Self::Auth(e)
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Auth(e) => e.into_response(),
            Self::MissingContext => {
                tracing::error!("Auth extractor used on a route without require_auth");
                ApiError::internal("Auth context not available").into_response()
            }
        }
    }
}

fn extract_auth(parts: &Parts) -> Result<AuthContext, AuthRejection> {
    parts
        .extensions
        .get::<AuthContext>()
        .cloned()
        .ok_or(AuthRejection::MissingContext)
}

/// Any authenticated caller
pub struct Authenticated {
    pub ctx: AuthContext,
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self {
            ctx: extract_auth(parts)?,
        })
    }
}

/// Caller with the admin role (or the auth-disabled local default)
pub struct AdminOnly {
    pub ctx: AuthContext,
}

impl<S> FromRequestParts<S> for AdminOnly
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = extract_auth(parts)?;
        ctx.require_admin()?;
        Ok(Self { ctx })
    }
}
