//! Data storage layer
//!
//! - `sqlite` - The transactional store (schema, migrations, repositories)
//! - `types` - Row types and closed vocabularies shared with the API
//! - `traits` - `CampusRepository`, the seam API handlers program against
//! - `error` - Unified error type for the data layer

pub mod error;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use error::DataError;
pub use sqlite::SqliteService;
pub use traits::CampusRepository;

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::config::DatabaseConfig;
use crate::core::storage::AppStorage;

/// Transactional database service
///
/// Wraps the backend-specific service behind an `Arc` so handlers and
/// background tasks can share it.
pub enum TransactionalService {
    /// SQLite backend (embedded)
    Sqlite(Arc<SqliteService>),
}

impl TransactionalService {
    /// Open the database at the storage-resolved path and run migrations
    pub async fn init(storage: &AppStorage, config: &DatabaseConfig) -> Result<Self, DataError> {
        let service = SqliteService::init(storage, config.max_connections).await?;
        Ok(Self::Sqlite(Arc::new(service)))
    }

    /// Underlying SQLite pool, for bulk loaders that manage their own transaction
    pub fn pool(&self) -> &sqlx::SqlitePool {
        match self {
            Self::Sqlite(s) => s.pool(),
        }
    }

    /// Run a WAL checkpoint
    pub async fn checkpoint(&self) -> Result<(), DataError> {
        match self {
            Self::Sqlite(s) => s.checkpoint().await.map_err(Into::into),
        }
    }

    /// Close the database connection gracefully
    pub async fn close(&self) {
        match self {
            Self::Sqlite(s) => s.close().await,
        }
    }

    /// Start the background checkpoint task
    pub fn start_checkpoint_task(&self, shutdown_rx: watch::Receiver<bool>) -> JoinHandle<()> {
        match self {
            Self::Sqlite(s) => s.start_checkpoint_task(shutdown_rx),
        }
    }

    /// Get the repository trait object for data operations
    pub fn repository(&self) -> Box<dyn CampusRepository + Send + Sync> {
        match self {
            Self::Sqlite(s) => Box::new(Arc::clone(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::UserRole;

    #[tokio::test]
    async fn test_repository_delegates_to_sqlite() {
        let service = SqliteService::open_in_memory().await.unwrap();
        let db = TransactionalService::Sqlite(Arc::new(service));
        let repo = db.repository();

        let uni = repo
            .create_university("University of Southern Maine", "ME", None)
            .await
            .unwrap();
        assert!(uni.was_created());

        let err = repo
            .create_user("ab", "hash", UserRole::User, None)
            .await
            .unwrap_err();
        assert_eq!(err.backend(), "sqlite");

        db.checkpoint().await.unwrap();
        db.close().await;
    }
}
