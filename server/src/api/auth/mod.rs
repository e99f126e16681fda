//! Authentication module

mod context;
mod extractors;
pub mod jwt;
mod manager;
pub mod middleware;

pub use context::AuthContext;
pub use extractors::{AdminOnly, AuthRejection, Authenticated};
pub use jwt::SessionClaims;
pub use manager::AuthManager;
pub use middleware::{AuthError, AuthState, require_auth};
