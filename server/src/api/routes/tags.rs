//! Tag vocabulary endpoints

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::data::types::{AccessibilityTag, EquipmentTag};

#[derive(Debug, Serialize, ToSchema)]
pub struct TagsResponse {
    pub tags: Vec<&'static str>,
}

/// Equipment tags accepted by `/api/addReview`
#[utoipa::path(
    get,
    path = "/api/equipmentTags",
    tag = "tags",
    responses(
        (status = 200, description = "Equipment tag vocabulary", body = TagsResponse)
    )
)]
pub async fn equipment_tags() -> Json<TagsResponse> {
    Json(TagsResponse {
        tags: EquipmentTag::ALL.iter().map(|t| t.as_str()).collect(),
    })
}

/// Accessibility tags accepted by `/api/addReview`
#[utoipa::path(
    get,
    path = "/api/accessibilityTags",
    tag = "tags",
    responses(
        (status = 200, description = "Accessibility tag vocabulary", body = TagsResponse)
    )
)]
pub async fn accessibility_tags() -> Json<TagsResponse> {
    Json(TagsResponse {
        tags: AccessibilityTag::ALL.iter().map(|t| t.as_str()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tag_lists_match_vocabularies() {
        let Json(equipment) = equipment_tags().await;
        assert_eq!(equipment.tags.len(), EquipmentTag::ALL.len());
        assert!(equipment.tags.contains(&"projector"));

        let Json(accessibility) = accessibility_tags().await;
        assert!(accessibility.tags.contains(&"wheelchair_accessible"));
    }
}
