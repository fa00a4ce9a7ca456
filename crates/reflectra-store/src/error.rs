use reflectra_shared::ReflectraError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Session database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// No platform data directory and none configured.
    #[error("Could not determine where to keep the session database")]
    NoDataDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration v{version:03} ({name}) failed: {reason}")]
    Migration {
        version: u32,
        name: &'static str,
        reason: String,
    },

    /// A stored `updated_at` that is not RFC 3339.
    #[error("Stored value `{key}` has a bad timestamp: {source}")]
    BadTimestamp {
        key: String,
        #[source]
        source: chrono::ParseError,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for ReflectraError {
    fn from(err: StoreError) -> Self {
        ReflectraError::Storage(err.to_string())
    }
}
