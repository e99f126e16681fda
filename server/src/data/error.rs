//! Unified error type for the data layer
//!
//! Wraps backend-specific errors while preserving which backend produced
//! them, so callers above the repository seam never see `SqliteError`.

use thiserror::Error;

/// Unified error type for data layer operations
#[derive(Error, Debug)]
pub enum DataError {
    /// SQLite database error
    #[error("SQLite error: {0}")]
    Sqlite(sqlx::Error),

    /// Migration failed
    #[error("Migration {version} ({name}) failed on {backend}: {error}")]
    MigrationFailed {
        backend: &'static str,
        version: i32,
        name: String,
        error: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Conflict error (duplicate entry, state transition not allowed)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A referenced row does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A stored value could not be decoded
    #[error("Invalid data: {0}")]
    Invalid(String),
}

impl DataError {
    /// Create a migration failed error
    pub fn migration_failed(backend: &'static str, version: i32, name: &str, error: &str) -> Self {
        Self::MigrationFailed {
            backend,
            version,
            name: name.to_string(),
            error: error.to_string(),
        }
    }

    /// Check if this is a connection-related error that might be transient
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Sqlite(e) => {
                matches!(
                    e,
                    sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
                )
            }
            Self::Io(_) => true,
            _ => false,
        }
    }

    /// Get the backend name that generated this error
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite",
            Self::MigrationFailed { backend, .. } => backend,
            Self::Io(_) | Self::Conflict(_) | Self::NotFound(_) | Self::Invalid(_) => "unknown",
        }
    }
}

/// Convert from the SQLite backend error type
impl From<crate::data::sqlite::SqliteError> for DataError {
    fn from(e: crate::data::sqlite::SqliteError) -> Self {
        use crate::data::sqlite::SqliteError;
        match e {
            SqliteError::Database(e) => Self::Sqlite(e),
            SqliteError::MigrationFailed {
                version,
                name,
                error,
            } => Self::MigrationFailed {
                backend: "sqlite",
                version,
                name,
                error,
            },
            SqliteError::Io(e) => Self::Io(e),
            SqliteError::Conflict(msg) => Self::Conflict(msg),
            SqliteError::NotFound(msg) => Self::NotFound(msg),
            SqliteError::Invalid(msg) => Self::Invalid(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::SqliteError;

    #[test]
    fn test_migration_failed_error_display() {
        let err = DataError::migration_failed("sqlite", 2, "add_room_floor", "syntax error");
        assert_eq!(
            err.to_string(),
            "Migration 2 (add_room_floor) failed on sqlite: syntax error"
        );
    }

    #[test]
    fn test_backend_method() {
        assert_eq!(
            DataError::migration_failed("sqlite", 1, "test", "error").backend(),
            "sqlite"
        );
        assert_eq!(DataError::Sqlite(sqlx::Error::PoolClosed).backend(), "sqlite");
        assert_eq!(DataError::Conflict("dup".into()).backend(), "unknown");
    }

    #[test]
    fn test_is_transient() {
        assert!(DataError::Sqlite(sqlx::Error::PoolTimedOut).is_transient());
        assert!(DataError::Sqlite(sqlx::Error::PoolClosed).is_transient());
        assert!(!DataError::Sqlite(sqlx::Error::RowNotFound).is_transient());
        assert!(!DataError::Conflict("dup".into()).is_transient());
        assert!(!DataError::migration_failed("sqlite", 1, "test", "error").is_transient());
    }

    #[test]
    fn test_from_sqlite_error_preserves_kind() {
        let err: DataError = SqliteError::Conflict("university has campuses".into()).into();
        assert!(matches!(err, DataError::Conflict(ref m) if m == "university has campuses"));

        let err: DataError = SqliteError::NotFound("campus 7".into()).into();
        assert!(matches!(err, DataError::NotFound(_)));
    }
}
