//! Location search parameters

use super::enums::{AccessibilityTag, EquipmentTag, LocationKind, RoomSize, RoomType};

/// Inclusive bounds on one rating dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingRange {
    pub min: i64,
    pub max: i64,
}

/// Per-dimension rating bounds; a location matches when a single rating
/// satisfies every specified range
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingRanges {
    pub score: Option<RatingRange>,
    pub noise: Option<RatingRange>,
    pub cleanliness: Option<RatingRange>,
    pub equipment_quality: Option<RatingRange>,
    pub wifi_strength: Option<RatingRange>,
}

impl RatingRanges {
    pub fn is_empty(&self) -> bool {
        self.score.is_none()
            && self.noise.is_none()
            && self.cleanliness.is_none()
            && self.equipment_quality.is_none()
            && self.wifi_strength.is_none()
    }

    /// `(column, range)` pairs for the specified dimensions
    pub fn specified(&self) -> Vec<(&'static str, RatingRange)> {
        [
            ("score", self.score),
            ("noise", self.noise),
            ("cleanliness", self.cleanliness),
            ("equipment_quality", self.equipment_quality),
            ("wifi_strength", self.wifi_strength),
        ]
        .into_iter()
        .filter_map(|(col, range)| range.map(|r| (col, r)))
        .collect()
    }
}

/// Filters for `/api/locationSearch`
///
/// Categories combine with AND; values inside one category combine with OR.
#[derive(Debug, Clone, Default)]
pub struct LocationSearchParams {
    pub university_id: i64,
    pub q: Option<String>,
    pub campus: Option<String>,
    pub building: Option<String>,
    pub room_number: Option<String>,
    pub kinds: Vec<LocationKind>,
    pub room_sizes: Vec<RoomSize>,
    pub room_types: Vec<RoomType>,
    pub equipment_tags: Vec<EquipmentTag>,
    pub accessibility_tags: Vec<AccessibilityTag>,
    pub ratings: RatingRanges,
    pub limit: i64,
}

impl LocationSearchParams {
    /// True when the query must join ratings
    pub fn needs_ratings(&self) -> bool {
        !self.ratings.is_empty()
            || !self.equipment_tags.is_empty()
            || !self.accessibility_tags.is_empty()
    }
}
