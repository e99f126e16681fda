//! Domain logic for campus facilities
//!
//! - `ingest` - Cleaning and loading scraped room documents
//! - `location` - Display names and location name resolution

pub mod ingest;
pub mod location;
