//! SQLite schema definitions
//!
//! Location subtypes are a tagged union: `location.kind` is the discriminant
//! and `(id, kind)` is a candidate key, so extension rows reference the
//! parent through a composite foreign key pinned to a single kind.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- 1. Universities
-- =============================================================================
CREATE TABLE IF NOT EXISTS university (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK(length(name) >= 1 AND length(name) <= 200),
    state TEXT NOT NULL CHECK(length(state) >= 1 AND length(state) <= 64),
    wiki_url TEXT,
    created_at INTEGER NOT NULL,
    UNIQUE (name, state)
);

CREATE INDEX IF NOT EXISTS idx_university_state ON university(state);

-- =============================================================================
-- 2. Campuses (a university may not be deleted while campuses reference it)
-- =============================================================================
CREATE TABLE IF NOT EXISTS campus (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    university_id INTEGER NOT NULL REFERENCES university(id) ON DELETE RESTRICT,
    name TEXT NOT NULL CHECK(length(name) >= 1 AND length(name) <= 200),
    created_at INTEGER NOT NULL,
    UNIQUE (university_id, name),
    UNIQUE (id, university_id)
);

-- =============================================================================
-- 3. Locations (discriminated by kind)
-- =============================================================================
CREATE TABLE IF NOT EXISTS location (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    university_id INTEGER NOT NULL,
    campus_id INTEGER NOT NULL,
    name TEXT NOT NULL CHECK(length(name) >= 1 AND length(name) <= 300),
    kind TEXT NOT NULL CHECK(kind IN ('building', 'nonbuilding', 'room')),
    created_at INTEGER NOT NULL,
    UNIQUE (id, kind),
    FOREIGN KEY (campus_id, university_id) REFERENCES campus(id, university_id) ON DELETE RESTRICT
);

CREATE INDEX IF NOT EXISTS idx_location_university ON location(university_id, kind);
CREATE INDEX IF NOT EXISTS idx_location_name ON location(university_id, name);

-- Buildings and non-buildings are create-if-absent per campus; rooms are not unique
CREATE UNIQUE INDEX IF NOT EXISTS idx_location_structure_name
    ON location(campus_id, kind, name) WHERE kind IN ('building', 'nonbuilding');

-- =============================================================================
-- 4. Rooms (extension of a room location, parent must be a building)
-- =============================================================================
CREATE TABLE IF NOT EXISTS rooms (
    location_id INTEGER PRIMARY KEY,
    kind TEXT NOT NULL DEFAULT 'room' CHECK(kind = 'room'),
    building_id INTEGER NOT NULL,
    building_kind TEXT NOT NULL DEFAULT 'building' CHECK(building_kind = 'building'),
    room_number TEXT,
    room_type TEXT NOT NULL CHECK(room_type IN ('classroom', 'study_room', 'lab', 'lecture_hall', 'other')),
    room_size TEXT NOT NULL CHECK(room_size IN ('small', 'medium', 'large')),
    floor TEXT,
    capacity INTEGER CHECK(capacity IS NULL OR capacity >= 0),
    image_url TEXT,
    FOREIGN KEY (location_id, kind) REFERENCES location(id, kind) ON DELETE CASCADE,
    FOREIGN KEY (building_id, building_kind) REFERENCES location(id, kind) ON DELETE RESTRICT
);

CREATE INDEX IF NOT EXISTS idx_rooms_building ON rooms(building_id);

CREATE TABLE IF NOT EXISTS room_attributes (
    location_id INTEGER NOT NULL REFERENCES rooms(location_id) ON DELETE CASCADE,
    attribute TEXT NOT NULL CHECK(length(attribute) >= 1),
    PRIMARY KEY (location_id, attribute)
);

-- =============================================================================
-- 5. Users
-- =============================================================================
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE COLLATE NOCASE CHECK(length(username) >= 3 AND length(username) <= 64),
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'user' CHECK(role IN ('user', 'admin')),
    university_id INTEGER REFERENCES university(id) ON DELETE SET NULL,
    created_at INTEGER NOT NULL
);

-- =============================================================================
-- 6. Ratings and tag attachments
-- =============================================================================
CREATE TABLE IF NOT EXISTS ratings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    location_id INTEGER NOT NULL REFERENCES location(id) ON DELETE CASCADE,
    score INTEGER NOT NULL CHECK(score BETWEEN 1 AND 10),
    noise INTEGER NOT NULL CHECK(noise BETWEEN 1 AND 5),
    cleanliness INTEGER NOT NULL CHECK(cleanliness BETWEEN 1 AND 5),
    equipment_quality INTEGER NOT NULL CHECK(equipment_quality BETWEEN 1 AND 3),
    wifi_strength INTEGER NOT NULL CHECK(wifi_strength BETWEEN 1 AND 3),
    comment TEXT CHECK(comment IS NULL OR length(comment) <= 2000),
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_ratings_location ON ratings(location_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_ratings_user ON ratings(user_id, created_at DESC);

CREATE TABLE IF NOT EXISTS rating_equipment (
    rating_id INTEGER NOT NULL REFERENCES ratings(id) ON DELETE CASCADE,
    tag TEXT NOT NULL,
    PRIMARY KEY (rating_id, tag)
);

CREATE TABLE IF NOT EXISTS rating_accessibility (
    rating_id INTEGER NOT NULL REFERENCES ratings(id) ON DELETE CASCADE,
    tag TEXT NOT NULL,
    PRIMARY KEY (rating_id, tag)
);

-- =============================================================================
-- 7. Room requests
-- =============================================================================
CREATE TABLE IF NOT EXISTS room_requests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    room_name TEXT NOT NULL CHECK(length(room_name) >= 1 AND length(room_name) <= 300),
    location_kind TEXT NOT NULL CHECK(location_kind IN ('building', 'nonbuilding', 'room')),
    requested_by INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    university_id INTEGER NOT NULL,
    campus_id INTEGER NOT NULL,
    building_id INTEGER,
    building_kind TEXT CHECK(building_kind IS NULL OR building_kind = 'building'),
    status TEXT NOT NULL DEFAULT 'pending' CHECK(status IN ('pending', 'approved', 'rejected')),
    created_location_id INTEGER REFERENCES location(id) ON DELETE SET NULL,
    created_at INTEGER NOT NULL,
    resolved_at INTEGER,
    CHECK ((location_kind = 'room') = (building_id IS NOT NULL)),
    CHECK ((building_id IS NULL) = (building_kind IS NULL)),
    FOREIGN KEY (campus_id, university_id) REFERENCES campus(id, university_id) ON DELETE CASCADE,
    FOREIGN KEY (building_id, building_kind) REFERENCES location(id, kind) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_room_requests_status ON room_requests(status, created_at);
"#;
