//! Document shapes consumed and produced by the ingestion commands

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One building block of the raw room scraper output
#[derive(Debug, Clone, Deserialize)]
pub struct RawBuilding {
    /// Page header, e.g. `List of Rooms in Bailey Hall on USM's Gorham Campus`
    pub building: String,
    #[serde(default)]
    pub rooms: Vec<RawRoom>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRoom {
    pub room: String,
    #[serde(default)]
    pub attributes: Vec<String>,
}

/// Cleaned room record written by `clean` and read by `load rooms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanRoom {
    pub institution: String,
    pub campus: String,
    pub building: String,
    pub room: String,
    pub room_number: Option<String>,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub has_web_conf: bool,
    #[serde(default = "default_true")]
    pub has_pc: bool,
    #[serde(default)]
    pub customized: bool,
}

fn default_true() -> bool {
    true
}

/// Entry of the university list document
#[derive(Debug, Clone, Deserialize)]
pub struct UniversityRecord {
    pub name: String,
    pub state: String,
    #[serde(default)]
    pub wiki_url: Option<String>,
}

/// Entry of the study room scraper output
#[derive(Debug, Clone, Deserialize)]
pub struct StudyRoomRecord {
    pub library: String,
    pub room_name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub floor: Option<String>,
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

/// Where a library's study rooms live
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LibraryTarget {
    /// `None` when the hosting building is unknown
    #[serde(default)]
    pub building: Option<String>,
    pub campus: String,
}

/// Library name to building and campus
pub type LibraryMap = HashMap<String, LibraryTarget>;

/// Counts reported by a loader run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub inserted: usize,
    pub skipped: usize,
    pub campuses_created: usize,
    pub buildings_created: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_room_defaults() {
        let json = r#"{
            "institution": "USM",
            "campus": "Portland",
            "building": "Luther Bonney Hall",
            "room": "Room 10",
            "room_number": null
        }"#;
        let room: CleanRoom = serde_json::from_str(json).unwrap();
        assert!(room.attributes.is_empty());
        assert!(room.has_pc);
        assert!(!room.has_web_conf);
    }

    #[test]
    fn test_library_map_parse() {
        let json = r#"{
            "Glickman Library": { "building": "Glickman Library", "campus": "Portland" },
            "LAC Library": { "building": null, "campus": "Lewiston-Auburn" }
        }"#;
        let map: LibraryMap = serde_json::from_str(json).unwrap();
        assert_eq!(map["LAC Library"].building, None);
        assert_eq!(map["Glickman Library"].campus, "Portland");
    }
}
