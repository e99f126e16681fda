// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "CampusInsider";

/// Application name in lowercase (for log filters and identifiers)
pub const APP_NAME_LOWER: &str = "campus_insider";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".campus-insider";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "campus-insider.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "CAMPUS_INSIDER_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "CAMPUS_INSIDER_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "CAMPUS_INSIDER_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "CAMPUS_INSIDER_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5055;

/// Default request body limit (1MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

// =============================================================================
// Environment Variables - Storage
// =============================================================================

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "CAMPUS_INSIDER_DATA_DIR";

/// Environment variable to override the SQLite database path
pub const ENV_DATABASE: &str = "CAMPUS_INSIDER_DATABASE";

// =============================================================================
// Secrets
// =============================================================================

/// Secrets vault file name (stored in the data directory)
pub const SECRETS_FILE_NAME: &str = "secrets.json";

/// Secret key name for JWT signing key
pub const SECRET_KEY_JWT_SIGNING: &str = "jwt_signing_key";

/// Environment variable carrying a hex session signing key (overrides the vault)
pub const ENV_SESSION_SECRET: &str = "CAMPUS_INSIDER_SESSION_SECRET";

/// Environment variable for the password used by `user create-admin`
pub const ENV_ADMIN_PASSWORD: &str = "CAMPUS_INSIDER_ADMIN_PASSWORD";

// =============================================================================
// Authentication
// =============================================================================

/// Cookie name for session token
pub const SESSION_COOKIE_NAME: &str = "campus_insider_session";

/// Default session TTL in days
pub const DEFAULT_SESSION_TTL_DAYS: u32 = 30;

/// Auth method recorded in session claims for password logins
pub const AUTH_METHOD_PASSWORD: &str = "password";

/// PBKDF2 iterations for new password hashes
pub const PASSWORD_HASH_ITERATIONS: u32 = 100_000;

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LENGTH: u64 = 8;

// =============================================================================
// SQLite Database
// =============================================================================

/// SQLite database filename
pub const SQLITE_DB_FILENAME: &str = "campus-insider.db";

/// SQLite connection pool max connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// SQLite cache size (negative = KB, so -64000 = 64MB)
pub const SQLITE_CACHE_SIZE: &str = "-64000";

/// SQLite WAL auto-checkpoint threshold (pages)
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";

/// Interval between periodic WAL checkpoints
pub const SQLITE_CHECKPOINT_INTERVAL_SECS: u64 = 300;

// =============================================================================
// Search
// =============================================================================

/// Maximum universities returned by `/api/search`
pub const SEARCH_RESULT_LIMIT: i64 = 50;

/// Default maximum rows returned by `/api/locationSearch`
pub const DEFAULT_LOCATION_SEARCH_LIMIT: i64 = 200;

/// Default and maximum page sizes for `/api/reviews`
pub const DEFAULT_REVIEWS_LIMIT: i64 = 50;
pub const MAX_REVIEWS_LIMIT: i64 = 200;

// =============================================================================
// Ratings
// =============================================================================

/// Lowest value of every rating dimension
pub const RATING_MIN: i64 = 1;

/// Upper bounds per dimension (mirrored by CHECK constraints on `ratings`)
pub const SCORE_MAX: i64 = 10;
pub const NOISE_MAX: i64 = 5;
pub const CLEANLINESS_MAX: i64 = 5;
pub const EQUIPMENT_QUALITY_MAX: i64 = 3;
pub const WIFI_STRENGTH_MAX: i64 = 3;

/// Longest accepted review comment
pub const MAX_COMMENT_LENGTH: u64 = 2000;

// =============================================================================
// Shutdown
// =============================================================================

/// Seconds to wait for background tasks during shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;
