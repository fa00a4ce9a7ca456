//! Records persisted in the local session database.

use chrono::{DateTime, Utc};

/// The token pair and display name written after a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    /// Bearer credential attached to every protected call.
    pub access_token: String,
    pub refresh_token: String,
    /// Username returned by the login endpoint.
    pub username: String,
}

/// One row of the `session_values` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionValue {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}
