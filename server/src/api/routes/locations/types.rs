//! Location search DTOs

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::types::ApiError;
use crate::core::constants::{
    CLEANLINESS_MAX, EQUIPMENT_QUALITY_MAX, NOISE_MAX, RATING_MIN, SCORE_MAX, WIFI_STRENGTH_MAX,
};
use crate::data::types::{
    LocationKind, LocationRow, LocationSearchParams, RatingRange, RatingRanges, RoomSize,
    RoomType, UnknownVariant,
};
use crate::domain::location::display_name;

/// Query params for `/api/locationSearch`
///
/// List-valued filters are comma separated, e.g. `room_size=small,medium`.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct LocationSearchQuery {
    pub university_id: Option<i64>,
    pub university: Option<String>,
    pub state: Option<String>,
    #[validate(length(max = 200, message = "Query must be at most 200 characters"))]
    pub q: Option<String>,
    pub campus: Option<String>,
    pub building: Option<String>,
    pub room_number: Option<String>,
    pub location_type: Option<String>,
    pub room_size: Option<String>,
    pub room_type: Option<String>,
    pub equipment_tags: Option<String>,
    pub accessibility_tags: Option<String>,
    pub min_score: Option<i64>,
    pub max_score: Option<i64>,
    pub min_noise: Option<i64>,
    pub max_noise: Option<i64>,
    pub min_cleanliness: Option<i64>,
    pub max_cleanliness: Option<i64>,
    pub min_equipment_quality: Option<i64>,
    pub max_equipment_quality: Option<i64>,
    pub min_wifi_strength: Option<i64>,
    pub max_wifi_strength: Option<i64>,
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parse a comma separated filter against a vocabulary
pub fn parse_list<T>(field: &str, raw: Option<&str>) -> Result<Vec<T>, ApiError>
where
    T: FromStr<Err = UnknownVariant> + PartialEq,
{
    let mut values = Vec::new();
    for part in raw.unwrap_or_default().split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let value = part
            .parse()
            .map_err(|e: UnknownVariant| ApiError::bad_request("INVALID_FILTER", format!("{}: {}", field, e)))?;
        if !values.contains(&value) {
            values.push(value);
        }
    }
    Ok(values)
}

/// Inclusive range for one dimension; a missing side defaults to its bound
fn parse_range(
    field: &str,
    min: Option<i64>,
    max: Option<i64>,
    upper: i64,
) -> Result<Option<RatingRange>, ApiError> {
    if min.is_none() && max.is_none() {
        return Ok(None);
    }
    let range = RatingRange {
        min: min.unwrap_or(RATING_MIN),
        max: max.unwrap_or(upper),
    };
    let in_bounds = |v: i64| (RATING_MIN..=upper).contains(&v);
    if !in_bounds(range.min) || !in_bounds(range.max) || range.min > range.max {
        return Err(ApiError::bad_request(
            "INVALID_FILTER",
            format!(
                "{} range must satisfy {} <= min <= max <= {}",
                field, RATING_MIN, upper
            ),
        ));
    }
    Ok(Some(range))
}

impl LocationSearchQuery {
    /// Validated search parameters for a resolved university
    pub fn to_params(
        &self,
        university_id: i64,
        limit: i64,
    ) -> Result<LocationSearchParams, ApiError> {
        Ok(LocationSearchParams {
            university_id,
            q: trimmed(&self.q),
            campus: trimmed(&self.campus),
            building: trimmed(&self.building),
            room_number: trimmed(&self.room_number),
            kinds: parse_list("location_type", self.location_type.as_deref())?,
            room_sizes: parse_list("room_size", self.room_size.as_deref())?,
            room_types: parse_list("room_type", self.room_type.as_deref())?,
            equipment_tags: parse_list("equipment_tags", self.equipment_tags.as_deref())?,
            accessibility_tags: parse_list(
                "accessibility_tags",
                self.accessibility_tags.as_deref(),
            )?,
            ratings: RatingRanges {
                score: parse_range("score", self.min_score, self.max_score, SCORE_MAX)?,
                noise: parse_range("noise", self.min_noise, self.max_noise, NOISE_MAX)?,
                cleanliness: parse_range(
                    "cleanliness",
                    self.min_cleanliness,
                    self.max_cleanliness,
                    CLEANLINESS_MAX,
                )?,
                equipment_quality: parse_range(
                    "equipment_quality",
                    self.min_equipment_quality,
                    self.max_equipment_quality,
                    EQUIPMENT_QUALITY_MAX,
                )?,
                wifi_strength: parse_range(
                    "wifi_strength",
                    self.min_wifi_strength,
                    self.max_wifi_strength,
                    WIFI_STRENGTH_MAX,
                )?,
            },
            limit,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationDto {
    pub location_id: i64,
    pub location_name: String,
    pub db_location_name: String,
    pub location_type: LocationKind,
    pub campus_name: String,
    pub building_name: Option<String>,
    pub room_number: Option<String>,
    pub room_type: Option<RoomType>,
    pub room_size: Option<RoomSize>,
}

impl From<LocationRow> for LocationDto {
    fn from(row: LocationRow) -> Self {
        Self {
            location_id: row.id,
            location_name: display_name(&row),
            db_location_name: row.name,
            location_type: row.kind,
            campus_name: row.campus_name,
            building_name: row.building_name,
            room_number: row.room_number,
            room_type: row.room_type,
            room_size: row.room_size,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationSearchResponse {
    pub university_id: i64,
    pub results: Vec<LocationDto>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::EquipmentTag;

    #[test]
    fn test_parse_list() {
        let sizes: Vec<RoomSize> = parse_list("room_size", Some("small, medium,,small")).unwrap();
        assert_eq!(sizes, vec![RoomSize::Small, RoomSize::Medium]);

        let none: Vec<RoomSize> = parse_list("room_size", None).unwrap();
        assert!(none.is_empty());

        let err = parse_list::<RoomSize>("room_size", Some("huge")).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_to_params() {
        let query = LocationSearchQuery {
            campus: Some(" Gorham ".to_string()),
            room_type: Some("classroom,study room".to_string()),
            equipment_tags: Some("projector".to_string()),
            min_noise: Some(2),
            ..Default::default()
        };
        let params = query.to_params(7, 100).unwrap();
        assert_eq!(params.university_id, 7);
        assert_eq!(params.campus.as_deref(), Some("Gorham"));
        assert_eq!(params.room_types, vec![RoomType::Classroom, RoomType::StudyRoom]);
        assert_eq!(params.equipment_tags, vec![EquipmentTag::Projector]);
        assert_eq!(
            params.ratings.noise,
            Some(RatingRange {
                min: 2,
                max: NOISE_MAX
            })
        );
        assert!(params.ratings.score.is_none());
        assert!(params.needs_ratings());
    }

    #[test]
    fn test_range_bounds() {
        let inverted = LocationSearchQuery {
            min_score: Some(8),
            max_score: Some(3),
            ..Default::default()
        };
        assert!(inverted.to_params(1, 10).is_err());

        let too_high = LocationSearchQuery {
            max_wifi_strength: Some(WIFI_STRENGTH_MAX + 1),
            ..Default::default()
        };
        assert!(too_high.to_params(1, 10).is_err());
    }
}
