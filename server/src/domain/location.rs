//! Location naming
//!
//! Rooms that carry both a parent building and a room number are shown as
//! `"<building> - Room <number>"`. Everything else keeps its stored name.
//! Reviewers refer to locations by any of these forms, so lookups try a
//! fixed chain of candidate names, from most to least literal.

use std::collections::HashSet;

use crate::data::types::{LocationKind, LocationRow, RatingRow};

const ROOM_SEPARATOR: &str = " - Room ";

/// Human-facing name of a location
pub fn display_name(location: &LocationRow) -> String {
    format_display_name(
        &location.name,
        location.kind,
        location.building_name.as_deref(),
        location.room_number.as_deref(),
    )
}

/// Display name of the location a rating points at
pub fn rating_display_name(rating: &RatingRow) -> String {
    format_display_name(
        &rating.location_name,
        rating.location_kind,
        rating.building_name.as_deref(),
        rating.room_number.as_deref(),
    )
}

fn format_display_name(
    name: &str,
    kind: LocationKind,
    building: Option<&str>,
    room_number: Option<&str>,
) -> String {
    match (kind, building, room_number) {
        (LocationKind::Room, Some(building), Some(number)) if !number.is_empty() => {
            format!("{}{}{}", building, ROOM_SEPARATOR, number)
        }
        _ => name.to_string(),
    }
}

/// Room number implied by a room name: its last whitespace-separated token
pub fn room_number_from_name(name: &str) -> Option<String> {
    name.split_whitespace().last().map(str::to_string)
}

/// Split a display name back into `(building, room number)`
pub fn parse_display_name(name: &str) -> Option<(&str, &str)> {
    let (building, number) = name.rsplit_once(ROOM_SEPARATOR)?;
    let (building, number) = (building.trim(), number.trim());
    if building.is_empty() || number.is_empty() {
        return None;
    }
    Some((building, number))
}

/// One step of the name resolution chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameCandidate {
    /// Match against `location.name`
    Name(String),
    /// Match a room by parent building name and room number
    BuildingRoom { building: String, room_number: String },
}

/// Candidates tried in order when resolving a location by name
///
/// Raw name, then the long `"B - Room N"` form, then the short `"B N"`
/// form, then the display name parsed into building and number. Repeated
/// forms are dropped.
pub fn name_candidates(name: &str) -> Vec<NameCandidate> {
    let raw = name.trim();
    if raw.is_empty() {
        return Vec::new();
    }

    let mut names = vec![raw.to_string()];
    let parsed = parse_display_name(raw);

    if let Some((building, number)) = parsed {
        names.push(format!("{}{}{}", building, ROOM_SEPARATOR, number));
        names.push(format!("{} {}", building, number));
    }

    let mut seen = HashSet::new();
    let mut candidates: Vec<NameCandidate> = names
        .into_iter()
        .filter(|n| seen.insert(n.clone()))
        .map(NameCandidate::Name)
        .collect();

    if let Some((building, number)) = parsed {
        candidates.push(NameCandidate::BuildingRoom {
            building: building.to_string(),
            room_number: number.to_string(),
        });
    }

    candidates
}

/// A location as listed in the university detail view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedLocation {
    pub location_id: i64,
    pub display_name: String,
    pub db_location_name: String,
    pub kind: LocationKind,
    pub campus_name: String,
    pub building_name: Option<String>,
}

/// Listing entries deduplicated by `(display name, kind)`; first row wins
pub fn list_display_locations(rows: &[LocationRow]) -> Vec<ListedLocation> {
    let mut seen: HashSet<(String, LocationKind)> = HashSet::new();
    let mut listed = Vec::with_capacity(rows.len());

    for row in rows {
        let name = display_name(row);
        if !seen.insert((name.clone(), row.kind)) {
            continue;
        }
        listed.push(ListedLocation {
            location_id: row.id,
            display_name: name,
            db_location_name: row.name.clone(),
            kind: row.kind,
            campus_name: row.campus_name.clone(),
            building_name: row.building_name.clone(),
        });
    }

    listed
}
