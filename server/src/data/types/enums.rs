//! Closed vocabularies shared by the store, the loaders and the API
//!
//! Each enum round-trips through the TEXT column it is stored in via
//! `as_str` / `FromStr`. The tag enums are the only definition of the tag
//! vocabularies; `/api/equipmentTags` and `/api/accessibilityTags` serve
//! `ALL` directly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error returned when a stored or submitted value is outside a vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

fn unknown(kind: &'static str, value: &str) -> UnknownVariant {
    UnknownVariant {
        kind,
        value: value.to_string(),
    }
}

// ============================================================================
// LOCATION ENUMS
// ============================================================================

/// Discriminant of a location row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Building,
    Nonbuilding,
    Room,
}

impl LocationKind {
    pub const ALL: [LocationKind; 3] = [Self::Building, Self::Nonbuilding, Self::Room];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Building => "building",
            Self::Nonbuilding => "nonbuilding",
            Self::Room => "room",
        }
    }
}

impl FromStr for LocationKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "building" => Ok(Self::Building),
            "nonbuilding" | "non-building" | "non_building" => Ok(Self::Nonbuilding),
            "room" => Ok(Self::Room),
            _ => Err(unknown("location type", s)),
        }
    }
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse room classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    Classroom,
    StudyRoom,
    Lab,
    LectureHall,
    Other,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classroom => "classroom",
            Self::StudyRoom => "study_room",
            Self::Lab => "lab",
            Self::LectureHall => "lecture_hall",
            Self::Other => "other",
        }
    }
}

impl FromStr for RoomType {
    type Err = UnknownVariant;

    /// Accepts both `study_room` and the spaced form `study room`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(' ', "_").as_str() {
            "classroom" => Ok(Self::Classroom),
            "study_room" => Ok(Self::StudyRoom),
            "lab" => Ok(Self::Lab),
            "lecture_hall" => Ok(Self::LectureHall),
            "other" => Ok(Self::Other),
            _ => Err(unknown("room type", s)),
        }
    }
}

/// Coarse room size bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoomSize {
    Small,
    Medium,
    Large,
}

impl RoomSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl FromStr for RoomSize {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            _ => Err(unknown("room size", s)),
        }
    }
}

// ============================================================================
// USER / REQUEST ENUMS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl FromStr for UserRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(unknown("role", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl FromStr for RequestStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(unknown("request status", s)),
        }
    }
}

// ============================================================================
// TAG VOCABULARIES
// ============================================================================

/// Equipment a reviewer can tag on a rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentTag {
    Projector,
    Whiteboard,
    Computers,
    SmartBoard,
    DocumentCamera,
    Microphone,
    PowerOutlets,
    Printer,
}

impl EquipmentTag {
    pub const ALL: [EquipmentTag; 8] = [
        Self::Projector,
        Self::Whiteboard,
        Self::Computers,
        Self::SmartBoard,
        Self::DocumentCamera,
        Self::Microphone,
        Self::PowerOutlets,
        Self::Printer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Projector => "projector",
            Self::Whiteboard => "whiteboard",
            Self::Computers => "computers",
            Self::SmartBoard => "smart_board",
            Self::DocumentCamera => "document_camera",
            Self::Microphone => "microphone",
            Self::PowerOutlets => "power_outlets",
            Self::Printer => "printer",
        }
    }
}

impl FromStr for EquipmentTag {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(' ', "_");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| unknown("equipment tag", s))
    }
}

/// Accessibility features a reviewer can tag on a rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccessibilityTag {
    WheelchairAccessible,
    ElevatorAccess,
    AutomaticDoors,
    AccessibleRestroom,
    HearingLoop,
    BrailleSignage,
}

impl AccessibilityTag {
    pub const ALL: [AccessibilityTag; 6] = [
        Self::WheelchairAccessible,
        Self::ElevatorAccess,
        Self::AutomaticDoors,
        Self::AccessibleRestroom,
        Self::HearingLoop,
        Self::BrailleSignage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WheelchairAccessible => "wheelchair_accessible",
            Self::ElevatorAccess => "elevator_access",
            Self::AutomaticDoors => "automatic_doors",
            Self::AccessibleRestroom => "accessible_restroom",
            Self::HearingLoop => "hearing_loop",
            Self::BrailleSignage => "braille_signage",
        }
    }
}

impl FromStr for AccessibilityTag {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(' ', "_");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| unknown("accessibility tag", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_kind_round_trip() {
        for kind in LocationKind::ALL {
            assert_eq!(kind.as_str().parse::<LocationKind>().unwrap(), kind);
        }
        assert_eq!(
            "Non-Building".parse::<LocationKind>().unwrap(),
            LocationKind::Nonbuilding
        );
        assert!("hallway".parse::<LocationKind>().is_err());
    }

    #[test]
    fn test_room_type_accepts_spaced_form() {
        assert_eq!("study room".parse::<RoomType>().unwrap(), RoomType::StudyRoom);
        assert_eq!("Lecture Hall".parse::<RoomType>().unwrap(), RoomType::LectureHall);
        assert_eq!(RoomType::StudyRoom.as_str(), "study_room");
    }

    #[test]
    fn test_room_size_parse() {
        assert_eq!(" Small ".parse::<RoomSize>().unwrap(), RoomSize::Small);
        let err = "huge".parse::<RoomSize>().unwrap_err();
        assert_eq!(err.to_string(), "unknown room size 'huge'");
    }

    #[test]
    fn test_user_role_is_strict() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert!("Admin".parse::<UserRole>().is_err());
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::default().is_admin());
    }

    #[test]
    fn test_tag_vocabularies() {
        assert_eq!(
            "smart board".parse::<EquipmentTag>().unwrap(),
            EquipmentTag::SmartBoard
        );
        assert_eq!(
            "hearing_loop".parse::<AccessibilityTag>().unwrap(),
            AccessibilityTag::HearingLoop
        );
        assert!("laser".parse::<EquipmentTag>().is_err());
        assert_eq!(
            serde_json::to_string(&EquipmentTag::PowerOutlets).unwrap(),
            "\"power_outlets\""
        );
    }
}
