//! Shared API types
//!
//! The error envelope used by every endpoint, plus small validators shared
//! by request DTOs.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;
use validator::ValidationError;

use crate::core::constants::MAX_REVIEWS_LIMIT;
use crate::data::DataError;

/// Validator for the `/api/reviews` page size
pub fn validate_reviews_limit(limit: i64) -> Result<(), ValidationError> {
    if !(1..=MAX_REVIEWS_LIMIT).contains(&limit) {
        return Err(ValidationError::new("limit_range")
            .with_message(format!("Limit must be between 1 and {}", MAX_REVIEWS_LIMIT).into()));
    }
    Ok(())
}

/// Validator for two-letter US state codes and similar short region names
pub fn validate_state(state: &str) -> Result<(), ValidationError> {
    let trimmed = state.trim();
    if trimmed.is_empty() || trimmed.len() > 32 {
        return Err(ValidationError::new("state_length")
            .with_message("State must be between 1 and 32 characters".into()));
    }
    Ok(())
}

/// Validator for names that are stored trimmed
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("Value cannot be blank".into()));
    }
    Ok(())
}

/// Plain message response
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    NotFound { code: String, message: String },
    Unauthorized { code: String, message: String },
    Forbidden { code: String, message: String },
    Conflict { code: String, message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn unauthorized(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unauthorized {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn forbidden(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Forbidden {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn conflict(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Store failure; the cause is logged and never echoed to the caller
    pub fn from_data(e: DataError) -> Self {
        tracing::error!(error = %e, transient = e.is_transient(), "Data error");
        Self::Internal {
            message: "Database operation failed".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_type, code, message) = match self {
            Self::BadRequest { code, message } => ("bad_request", code, message),
            Self::NotFound { code, message } => ("not_found", code, message),
            Self::Unauthorized { code, message } => ("unauthorized", code, message),
            Self::Forbidden { code, message } => ("forbidden", code, message),
            Self::Conflict { code, message } => ("conflict", code, message),
            Self::Internal { message } => ("internal_error", "INTERNAL".to_string(), message),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_reviews_limit() {
        assert!(validate_reviews_limit(1).is_ok());
        assert!(validate_reviews_limit(MAX_REVIEWS_LIMIT).is_ok());
        assert!(validate_reviews_limit(0).is_err());
        assert!(validate_reviews_limit(MAX_REVIEWS_LIMIT + 1).is_err());
    }

    #[test]
    fn test_validate_state() {
        assert!(validate_state("ME").is_ok());
        assert!(validate_state("  ").is_err());
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank(" Gorham ").is_ok());
        assert!(not_blank(" \t ").is_err());
        assert!(not_blank("").is_err());
    }

    #[tokio::test]
    async fn test_from_data_hides_details() {
        let err = ApiError::from_data(DataError::Conflict("users.username".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "internal_error");
        assert_eq!(json["message"], "Database operation failed");
        assert!(!json.to_string().contains("users.username"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::conflict("X", "y").status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::unauthorized("X", "y").status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
