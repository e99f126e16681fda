//! Authentication manager

use anyhow::Result;

use super::jwt::{JwtError, SessionClaims, create_session_token, validate_session_token};
use crate::core::constants::AUTH_METHOD_PASSWORD;
use crate::core::{AuthConfig, SecretManager};

/// Issues and validates session tokens
#[derive(Debug)]
pub struct AuthManager {
    signing_key: Vec<u8>,
    enabled: bool,
    session_ttl_days: u32,
}

impl AuthManager {
    pub fn new(signing_key: Vec<u8>, enabled: bool, session_ttl_days: u32) -> Self {
        Self {
            signing_key,
            enabled,
            session_ttl_days,
        }
    }

    /// Initialize the authentication manager
    pub async fn init(secrets: &SecretManager, config: &AuthConfig) -> Result<Self> {
        let signing_key = secrets.get_jwt_signing_key().await?;

        if config.enabled {
            tracing::debug!(ttl_days = config.session_ttl_days, "Authentication enabled");
        } else {
            tracing::warn!("Authentication DISABLED, every caller acts as the local admin");
        }

        Ok(Self::new(
            signing_key,
            config.enabled,
            config.session_ttl_days,
        ))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn session_ttl_days(&self) -> u32 {
        self.session_ttl_days
    }

    /// Issue a session token after a successful password check
    pub fn create_session(&self, user_id: i64) -> Result<String> {
        create_session_token(
            &self.signing_key,
            user_id,
            AUTH_METHOD_PASSWORD,
            self.session_ttl_days,
        )
    }

    /// Validate a JWT session token
    pub fn validate_session(&self, jwt: &str) -> Result<SessionClaims, JwtError> {
        validate_session_token(jwt, &self.signing_key)
    }
}
