//! SQLite database service
//!
//! The single store behind the campus catalog, accounts, ratings and room
//! requests. Tuned for an embedded single-node deployment:
//! - WAL mode for concurrent reads during writes
//! - Foreign keys enforced on every connection
//! - Periodic WAL checkpointing
//!
//! All schema definitions and migrations are managed here.

pub mod error;
pub mod filters;
mod migrations;
pub mod repositories;
mod repository_impl;
pub mod schema;

pub use error::{SqliteError, is_foreign_key_violation, is_unique_violation};
pub use sqlx::SqlitePool;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use sqlx::{ConnectOptions, Sqlite, Transaction};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::log::LevelFilter;

use crate::core::constants::{
    SQLITE_BUSY_TIMEOUT_SECS, SQLITE_CACHE_SIZE, SQLITE_CHECKPOINT_INTERVAL_SECS,
    SQLITE_WAL_AUTOCHECKPOINT,
};
use crate::core::storage::AppStorage;

/// SQLite database service
///
/// Created once at startup (or once per CLI command) and shared.
pub struct SqliteService {
    pool: SqlitePool,
}

impl SqliteService {
    /// Open (creating if missing) the database file and run pending migrations
    pub async fn init(storage: &AppStorage, max_connections: u32) -> Result<Self, SqliteError> {
        Self::open(&storage.database_path(), max_connections).await
    }

    async fn open(db_path: &Path, max_connections: u32) -> Result<Self, SqliteError> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(SQLITE_BUSY_TIMEOUT_SECS))
            .pragma("cache_size", SQLITE_CACHE_SIZE)
            .pragma("temp_store", "MEMORY")
            .pragma("wal_autocheckpoint", SQLITE_WAL_AUTOCHECKPOINT)
            .log_statements(LevelFilter::Trace);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        migrations::run_migrations(&pool).await?;

        tracing::debug!(path = %db_path.display(), max_connections, "SqliteService initialized");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Fresh migrated in-memory database
    #[cfg(test)]
    pub async fn open_in_memory() -> Result<Self, SqliteError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(SqliteConnectOptions::new().in_memory(true).foreign_keys(true))
            .await?;
        migrations::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn checkpoint(&self) -> Result<(), SqliteError> {
        sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
            .execute(&self.pool)
            .await?;
        tracing::debug!("WAL checkpoint completed");
        Ok(())
    }

    /// Close the connection pool gracefully
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("SQLite pool closed");
    }

    pub fn start_checkpoint_task(
        self: &Arc<Self>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let db = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(SQLITE_CHECKPOINT_INTERVAL_SECS));
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::debug!("WAL checkpoint task shutting down");
                            break;
                        }
                    }
                    _ = interval.tick() => {
                        if let Err(e) = db.checkpoint().await {
                            tracing::warn!("WAL checkpoint failed: {}", e);
                        }
                    }
                }
            }
        })
    }
}

/// Begin a transaction holding the write lock (`BEGIN IMMEDIATE`)
///
/// Used for every transaction that writes; waits on the busy timeout.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

/// Migrated single-connection in-memory pool for repository tests
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    match SqliteService::open_in_memory().await {
        Ok(service) => service.pool,
        Err(e) => panic!("failed to open test database: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::traits::CampusRepository;

    #[tokio::test]
    async fn test_concurrent_create_if_absent_on_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let service = Arc::new(
            SqliteService::open(&dir.path().join("campus.db"), 8)
                .await
                .unwrap(),
        );

        for round in 0..10 {
            let name = format!("University {}", round);
            let tasks: Vec<_> = (0..4)
                .map(|_| {
                    let service = Arc::clone(&service);
                    let name = name.clone();
                    tokio::spawn(async move { service.create_university(&name, "ME", None).await })
                })
                .collect();

            let mut created = 0;
            let mut ids = Vec::new();
            for task in tasks {
                let upserted = task.await.unwrap().unwrap();
                if upserted.was_created() {
                    created += 1;
                }
                ids.push(upserted.into_inner().id);
            }
            assert_eq!(created, 1, "round {}", round);
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), 1, "round {}", round);

            let campus_tasks: Vec<_> = (0..4)
                .map(|_| {
                    let service = Arc::clone(&service);
                    let university_id = ids[0];
                    tokio::spawn(async move { service.create_campus(university_id, "Gorham").await })
                })
                .collect();
            for task in campus_tasks {
                task.await.unwrap().unwrap();
            }
        }

        service.close().await;
    }
}
