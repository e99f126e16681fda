//! Authentication context injected by `require_auth`

use crate::api::types::ApiError;
use crate::data::types::{UserRole, UserRow};

/// Who is making the request
#[derive(Debug, Clone)]
pub enum AuthContext {
    /// Session-authenticated user, reloaded from the store on every request
    Session {
        user_id: i64,
        username: String,
        role: UserRole,
        university_id: Option<i64>,
    },
    /// Auth disabled (`--no-auth`): acts with admin capability and no identity
    LocalDefault,
}

impl AuthContext {
    pub fn from_user(user: &UserRow) -> Self {
        Self::Session {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
            university_id: user.university_id,
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        match self {
            Self::Session { user_id, .. } => Some(*user_id),
            Self::LocalDefault => None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Session { username, .. } => Some(username),
            Self::LocalDefault => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        match self {
            Self::Session { role, .. } => role.is_admin(),
            Self::LocalDefault => true,
        }
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden(
                "ADMIN_REQUIRED",
                "This operation requires an admin account",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: UserRole) -> AuthContext {
        AuthContext::Session {
            user_id: 5,
            username: "casey".to_string(),
            role,
            university_id: None,
        }
    }

    #[test]
    fn test_admin_capability() {
        assert!(session(UserRole::Admin).require_admin().is_ok());
        assert!(session(UserRole::User).require_admin().is_err());
        assert!(AuthContext::LocalDefault.require_admin().is_ok());
    }

    #[test]
    fn test_identity() {
        let ctx = session(UserRole::User);
        assert_eq!(ctx.user_id(), Some(5));
        assert_eq!(ctx.username(), Some("casey"));
        assert_eq!(AuthContext::LocalDefault.user_id(), None);
    }
}
