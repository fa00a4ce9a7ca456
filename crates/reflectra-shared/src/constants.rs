/// Application name
pub const APP_NAME: &str = "Reflectra";

/// Hostnames that select the local development backend
pub const LOCAL_HOSTNAMES: &[&str] = &["localhost", "127.0.0.1"];

/// Backend origin used during local development
pub const LOCAL_ORIGIN: &str = "http://127.0.0.1:8000";

/// Backend origin used everywhere else
pub const PRODUCTION_ORIGIN: &str = "https://reflectra-backend.onrender.com";

/// Persistent storage keys. All three are written on login and cleared together.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const USERNAME_KEY: &str = "username";

/// Inclusive bounds for mood and stress scores
pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 10;

/// Followees offered as chat shortcuts when the inbox is empty
pub const SUGGESTED_CONTACTS_LIMIT: usize = 4;

/// Default transport timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
