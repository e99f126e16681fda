//! Rating API DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::types::{ApiError, validate_reviews_limit};
use crate::core::constants::{
    CLEANLINESS_MAX, DEFAULT_REVIEWS_LIMIT, EQUIPMENT_QUALITY_MAX, MAX_COMMENT_LENGTH, NOISE_MAX,
    RATING_MIN, SCORE_MAX, WIFI_STRENGTH_MAX,
};
use crate::data::types::{
    AccessibilityTag, EquipmentTag, LocationKind, LocationRow, RatingRow, RatingSummary, UserRole,
};
use crate::domain::location::{display_name, rating_display_name};

/// Body of `/api/addReview`
///
/// The location is given by `location_id`, or by `location` plus
/// `university` (optionally narrowed by `state` and `campus`).
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddReviewRequest {
    /// Must match the session user when present; required with auth disabled
    pub username: Option<String>,
    pub location_id: Option<i64>,
    pub location: Option<String>,
    pub university: Option<String>,
    pub state: Option<String>,
    pub campus: Option<String>,
    #[validate(range(min = RATING_MIN, max = SCORE_MAX, message = "score must be 1-10"))]
    pub score: i64,
    #[validate(range(min = RATING_MIN, max = NOISE_MAX, message = "noise must be 1-5"))]
    pub noise: i64,
    #[validate(range(
        min = RATING_MIN,
        max = CLEANLINESS_MAX,
        message = "cleanliness must be 1-5"
    ))]
    pub cleanliness: i64,
    #[validate(range(
        min = RATING_MIN,
        max = EQUIPMENT_QUALITY_MAX,
        message = "equipment_quality must be 1-3"
    ))]
    pub equipment_quality: i64,
    #[validate(range(
        min = RATING_MIN,
        max = WIFI_STRENGTH_MAX,
        message = "wifi_strength must be 1-3"
    ))]
    pub wifi_strength: i64,
    #[validate(length(max = MAX_COMMENT_LENGTH, message = "Comment must be at most 2000 characters"))]
    pub comment: Option<String>,
    #[serde(default)]
    pub equipment_tags: Vec<String>,
    #[serde(default)]
    pub accessibility_tags: Vec<String>,
}

/// Parse submitted tags against a vocabulary, dropping repeats
pub fn parse_tags<T>(field: &str, raw: &[String]) -> Result<Vec<T>, ApiError>
where
    T: std::str::FromStr<Err = crate::data::types::UnknownVariant> + PartialEq,
{
    let mut tags = Vec::with_capacity(raw.len());
    for value in raw {
        let tag: T = value
            .parse()
            .map_err(|e| ApiError::bad_request("INVALID_TAG", format!("{}: {}", field, e)))?;
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    Ok(tags)
}

impl AddReviewRequest {
    pub fn equipment(&self) -> Result<Vec<EquipmentTag>, ApiError> {
        parse_tags("equipment_tags", &self.equipment_tags)
    }

    pub fn accessibility(&self) -> Result<Vec<AccessibilityTag>, ApiError> {
        parse_tags("accessibility_tags", &self.accessibility_tags)
    }

    pub fn trimmed_comment(&self) -> Option<String> {
        self.comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    }
}

/// Query params for `/api/locationRatings`
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LocationRatingsQuery {
    pub location_id: Option<i64>,
    pub location: Option<String>,
    pub university: Option<String>,
    pub state: Option<String>,
    pub campus: Option<String>,
}

fn default_reviews_limit() -> i64 {
    DEFAULT_REVIEWS_LIMIT
}

/// Query params for `/api/reviews`
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReviewsQuery {
    pub username: Option<String>,
    pub university: Option<String>,
    pub state: Option<String>,
    #[serde(default = "default_reviews_limit")]
    #[validate(custom(function = "validate_reviews_limit"))]
    pub limit: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RatingDto {
    pub id: i64,
    pub username: String,
    pub role: UserRole,
    pub location_id: i64,
    pub location_name: String,
    pub location_type: LocationKind,
    pub campus_name: String,
    pub university_name: String,
    pub score: i64,
    pub noise: i64,
    pub cleanliness: i64,
    pub equipment_quality: i64,
    pub wifi_strength: i64,
    pub comment: Option<String>,
    /// Unix seconds
    pub created_at: i64,
    pub equipment_tags: Vec<String>,
    pub accessibility_tags: Vec<String>,
}

impl From<RatingRow> for RatingDto {
    fn from(r: RatingRow) -> Self {
        Self {
            location_name: rating_display_name(&r),
            id: r.id,
            username: r.username,
            role: r.role,
            location_id: r.location_id,
            location_type: r.location_kind,
            campus_name: r.campus_name,
            university_name: r.university_name,
            score: r.score,
            noise: r.noise,
            cleanliness: r.cleanliness,
            equipment_quality: r.equipment_quality,
            wifi_strength: r.wifi_strength,
            comment: r.comment,
            created_at: r.created_at,
            equipment_tags: r.equipment_tags,
            accessibility_tags: r.accessibility_tags,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddReviewResponse {
    pub message: String,
    pub rating: RatingDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationInfoDto {
    pub location_id: i64,
    pub location_name: String,
    pub db_location_name: String,
    pub location_type: LocationKind,
    pub campus_name: String,
    pub building_name: Option<String>,
    pub room_number: Option<String>,
    /// Scraped room attributes (rooms only)
    pub attributes: Vec<String>,
}

impl LocationInfoDto {
    pub fn new(row: LocationRow, attributes: Vec<String>) -> Self {
        Self {
            location_name: display_name(&row),
            location_id: row.id,
            db_location_name: row.name,
            location_type: row.kind,
            campus_name: row.campus_name,
            building_name: row.building_name,
            room_number: row.room_number,
            attributes,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RatingSummaryDto {
    pub count: i64,
    pub average_score: Option<f64>,
}

impl From<RatingSummary> for RatingSummaryDto {
    fn from(s: RatingSummary) -> Self {
        Self {
            count: s.count,
            average_score: s.average_score,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationRatingsResponse {
    pub location: LocationInfoDto,
    pub summary: RatingSummaryDto,
    /// Newest first
    pub ratings: Vec<RatingDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewsResponse {
    pub reviews: Vec<RatingDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: serde_json::Value) -> Result<AddReviewRequest, serde_json::Error> {
        serde_json::from_value(json)
    }

    #[test]
    fn test_dimension_bounds() {
        let mut body = serde_json::json!({
            "location_id": 1,
            "score": 10, "noise": 5, "cleanliness": 1,
            "equipment_quality": 3, "wifi_strength": 1
        });
        assert!(request(body.clone()).unwrap().validate().is_ok());

        body["equipment_quality"] = serde_json::json!(4);
        assert!(request(body.clone()).unwrap().validate().is_err());

        body["equipment_quality"] = serde_json::json!(2);
        body["score"] = serde_json::json!(0);
        assert!(request(body).unwrap().validate().is_err());
    }

    #[test]
    fn test_missing_dimension_fails_to_parse() {
        let body = serde_json::json!({
            "location_id": 1,
            "score": 7, "noise": 2, "cleanliness": 3, "equipment_quality": 2
        });
        assert!(request(body).is_err());
    }

    #[test]
    fn test_parse_tags() {
        let tags: Vec<EquipmentTag> = parse_tags(
            "equipment_tags",
            &["projector".to_string(), "projector".to_string()],
        )
        .unwrap();
        assert_eq!(tags, vec![EquipmentTag::Projector]);

        let err = parse_tags::<AccessibilityTag>("accessibility_tags", &["ramp".to_string()])
            .unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }
}
