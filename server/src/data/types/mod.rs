//! Shared data types for the data layer

mod enums;
mod search;
mod transactional;

pub use enums::{
    AccessibilityTag, EquipmentTag, LocationKind, RequestStatus, RoomSize, RoomType,
    UnknownVariant, UserRole,
};

pub use search::{LocationSearchParams, RatingRange, RatingRanges};

pub use transactional::{
    CampusRow, LocationRow, NewRating, NewRoom, NewRoomRequest, RatingRow, RatingSummary,
    RequestResolution, ReviewFilter, RoomRequestRow, UniversityRow, UniversitySummary, Upserted,
    UserRow,
};
