//! Raw room document cleaning
//!
//! Canonicalizes whitespace, maps attribute synonyms onto the attribute
//! vocabulary, merges duplicate rooms within a building and derives the
//! boolean convenience flags.

use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use regex::Regex;

use super::types::{CleanRoom, RawBuilding};

pub const UNKNOWN_BUILDING: &str = "Unknown Building";
pub const UNKNOWN_CAMPUS: &str = "Unknown Campus";
const LEWISTON_AUBURN: &str = "Lewiston-Auburn";

pub const ATTR_WEB_CONFERENCING: &str = "web_conferencing";
pub const ATTR_NO_PC: &str = "no_pc";
pub const ATTR_CUSTOM: &str = "custom";

/// Scraped attribute text -> vocabulary entry
const ATTRIBUTE_SYNONYMS: &[(&str, &str)] = &[
    ("Web Conferencing Lecture Style", ATTR_WEB_CONFERENCING),
    ("Presentation", "presentation"),
    ("Customizations", ATTR_CUSTOM),
    ("No In-Room PC", ATTR_NO_PC),
    ("No In-Room PCs", ATTR_NO_PC),
    ("No Tech", "no_tech"),
];

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^List of Rooms in (.*?) on (?:[^\s']+'s )?(.*?) Campus")
            .expect("Invalid regex")
    })
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex"))
}

fn digits_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+").expect("Invalid regex"))
}

/// Replace non-breaking spaces, collapse whitespace runs and trim
pub fn clean_text(s: &str) -> String {
    let s = s.replace('\u{00a0}', " ");
    whitespace_regex().replace_all(&s, " ").trim().to_string()
}

/// Extract `(building, campus)` from a page header
///
/// Either part may be unknown; callers substitute the fallbacks.
pub fn parse_building_header(header: &str) -> (Option<String>, Option<String>) {
    if let Some(caps) = header_regex().captures(header) {
        let building = caps.get(1).map(|m| clean_text(m.as_str()));
        let campus = caps.get(2).map(|m| clean_text(m.as_str()));
        return (
            building.filter(|b| !b.is_empty()),
            campus.filter(|c| !c.is_empty()),
        );
    }

    if header.contains("Lewiston") {
        return (None, Some(LEWISTON_AUBURN.to_string()));
    }

    let building = clean_text(header);
    (Some(building).filter(|b| !b.is_empty()), None)
}

/// Map one attribute onto the vocabulary; unmapped text is lowercased
pub fn normalize_attribute(attribute: &str) -> String {
    let cleaned = clean_text(attribute);
    ATTRIBUTE_SYNONYMS
        .iter()
        .find(|(raw, _)| *raw == cleaned)
        .map(|(_, norm)| norm.to_string())
        .unwrap_or_else(|| cleaned.to_lowercase())
}

/// Normalize a list, keeping first-occurrence order without duplicates
pub fn normalize_attributes<S: AsRef<str>>(attributes: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(attributes.len());
    for attribute in attributes {
        let norm = normalize_attribute(attribute.as_ref());
        if !norm.is_empty() && !out.contains(&norm) {
            out.push(norm);
        }
    }
    out
}

/// First run of digits in a room name
pub fn parse_room_number(room_name: &str) -> Option<String> {
    digits_regex()
        .find(room_name)
        .map(|m| m.as_str().to_string())
}

/// Clean a whole raw document
///
/// Rooms are merged by cleaned name within each building and keep the
/// order in which each name first appears.
pub fn clean_buildings(raw: &[RawBuilding], institution: &str) -> Vec<CleanRoom> {
    let mut cleaned = Vec::new();

    for block in raw {
        let (building, campus) = parse_building_header(&block.building);
        let building = building.unwrap_or_else(|| UNKNOWN_BUILDING.to_string());
        let campus = campus.unwrap_or_else(|| UNKNOWN_CAMPUS.to_string());

        let mut order: Vec<String> = Vec::new();
        let mut merged: HashMap<String, BTreeSet<String>> = HashMap::new();

        for room in &block.rooms {
            let name = clean_text(&room.room);
            if name.is_empty() {
                continue;
            }
            let attributes = merged.entry(name.clone()).or_insert_with(|| {
                order.push(name.clone());
                BTreeSet::new()
            });
            attributes.extend(normalize_attributes(&room.attributes));
        }

        for name in order {
            let attributes = merged.remove(&name).unwrap_or_default();
            cleaned.push(CleanRoom {
                institution: institution.to_string(),
                campus: campus.clone(),
                building: building.clone(),
                room_number: parse_room_number(&name),
                has_web_conf: attributes.contains(ATTR_WEB_CONFERENCING),
                has_pc: !attributes.contains(ATTR_NO_PC),
                customized: attributes.contains(ATTR_CUSTOM),
                attributes: attributes.into_iter().collect(),
                room: name,
            });
        }
    }

    tracing::debug!(
        buildings = raw.len(),
        rooms = cleaned.len(),
        "Cleaned room document"
    );
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ingest::types::RawRoom;

    fn raw_room(name: &str, attributes: &[&str]) -> RawRoom {
        RawRoom {
            room: name.to_string(),
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  Bailey\u{00a0}Hall \n 101 "), "Bailey Hall 101");
        assert_eq!(clean_text("\t"), "");
    }

    #[test]
    fn test_parse_building_header() {
        assert_eq!(
            parse_building_header("List of Rooms in Bailey Hall on USM's Gorham Campus"),
            (Some("Bailey Hall".to_string()), Some("Gorham".to_string()))
        );
        assert_eq!(
            parse_building_header("list of rooms in  Luther Bonney Hall on the Portland Campus"),
            (
                Some("Luther Bonney Hall".to_string()),
                Some("the Portland".to_string())
            )
        );
        assert_eq!(
            parse_building_header("List of Rooms on the Lewiston-Auburn Campus"),
            (None, Some("Lewiston-Auburn".to_string()))
        );
        assert_eq!(
            parse_building_header("  Abromson\u{00a0}Center "),
            (Some("Abromson Center".to_string()), None)
        );
    }

    #[test]
    fn test_normalize_attribute_synonyms() {
        assert_eq!(normalize_attribute("No In-Room PCs"), "no_pc");
        assert_eq!(normalize_attribute("No  In-Room\u{00a0}PC"), "no_pc");
        assert_eq!(
            normalize_attribute("Web Conferencing Lecture Style"),
            "web_conferencing"
        );
        assert_eq!(normalize_attribute("Lecture Capture"), "lecture capture");
    }

    #[test]
    fn test_normalize_attributes_is_idempotent() {
        let raw = [
            "Presentation",
            "No Tech",
            "presentation",
            "Customizations",
            "Document Camera",
        ];
        let once = normalize_attributes(&raw);
        assert_eq!(once, vec!["presentation", "no_tech", "custom", "document camera"]);
        assert_eq!(normalize_attributes(&once), once);
    }

    #[test]
    fn test_parse_room_number() {
        assert_eq!(parse_room_number("Bailey Hall 101"), Some("101".to_string()));
        assert_eq!(parse_room_number("Room 10B"), Some("10".to_string()));
        assert_eq!(parse_room_number("Gym"), None);
    }

    #[test]
    fn test_clean_buildings_merges_duplicate_rooms() {
        let raw = vec![RawBuilding {
            building: "List of Rooms in Bailey Hall on USM's Gorham Campus".to_string(),
            rooms: vec![
                raw_room("Bailey  101", &["Presentation", "No In-Room PCs"]),
                raw_room("Bailey 202", &["Web Conferencing Lecture Style"]),
                raw_room("Bailey\u{00a0}101", &["Customizations", "Presentation"]),
            ],
        }];

        let cleaned = clean_buildings(&raw, "USM");
        assert_eq!(cleaned.len(), 2);

        let first = &cleaned[0];
        assert_eq!(first.room, "Bailey 101");
        assert_eq!(first.building, "Bailey Hall");
        assert_eq!(first.campus, "Gorham");
        assert_eq!(first.room_number.as_deref(), Some("101"));
        assert_eq!(first.attributes, vec!["custom", "no_pc", "presentation"]);
        assert!(!first.has_pc);
        assert!(first.customized);
        assert!(!first.has_web_conf);

        let second = &cleaned[1];
        assert!(second.has_web_conf);
        assert!(second.has_pc);
    }

    #[test]
    fn test_clean_buildings_fallback_names() {
        let raw = vec![
            RawBuilding {
                building: "List of Rooms on the Lewiston-Auburn Campus".to_string(),
                rooms: vec![raw_room("LAC 170", &[])],
            },
            RawBuilding {
                building: "Science Building".to_string(),
                rooms: vec![raw_room("  ", &["No Tech"])],
            },
        ];

        let cleaned = clean_buildings(&raw, "USM");
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].building, UNKNOWN_BUILDING);
        assert_eq!(cleaned[0].campus, "Lewiston-Auburn");
        assert_eq!(cleaned[0].institution, "USM");
    }
}
