//! Ingestion pipeline: cleaning raw scraper output and bulk loading
//!
//! - `types` - Document shapes read and written by the CLI commands
//! - `clean` - Text canonicalization and attribute normalization
//! - `loader` - Transactional bulk loaders
//! - `export` - CSV rendering of cleaned records

pub mod clean;
pub mod export;
pub mod loader;
pub mod types;

pub use clean::clean_buildings;
pub use export::rooms_to_csv;
pub use loader::{load_rooms, load_study_rooms, load_universities};
pub use types::{
    CleanRoom, LibraryMap, LibraryTarget, LoadReport, RawBuilding, StudyRoomRecord,
    UniversityRecord,
};

use thiserror::Error;

use crate::data::sqlite::SqliteError;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Store error: {0}")]
    Store(#[from] SqliteError),

    #[error("Library '{0}' is missing from the library map")]
    UnknownLibrary(String),

    #[error("Record {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}
