//! v001 -- Initial schema creation.
//!
//! A single key/value table holding the persisted session fields.

use rusqlite::Connection;

const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS session_values (
    key        TEXT PRIMARY KEY NOT NULL,   -- fixed names: accessToken, refreshToken, username
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL                -- RFC-3339
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
