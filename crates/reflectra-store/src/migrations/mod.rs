//! Schema migrations for the session database.
//!
//! `PRAGMA user_version` records the last applied step. Steps run in order,
//! each inside its own transaction together with the version bump.

pub mod v001_initial;

use rusqlite::Connection;

use crate::error::{Result, StoreError};

type Step = fn(&Connection) -> rusqlite::Result<()>;

/// `(version, name, step)`, ascending by version.
const MIGRATIONS: &[(u32, &str, Step)] = &[(1, "initial", v001_initial::up)];

pub const CURRENT_VERSION: u32 = 1;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if current >= CURRENT_VERSION {
        tracing::debug!(version = current, "session database up to date");
        return Ok(());
    }

    for &(version, name, step) in MIGRATIONS.iter().filter(|(v, _, _)| *v > current) {
        tracing::info!(version, name, "applying session database migration");
        let tx = conn.unchecked_transaction()?;
        step(&tx)
            .and_then(|_| tx.pragma_update(None, "user_version", version))
            .map_err(|e| StoreError::Migration {
                version,
                name,
                reason: e.to_string(),
            })?;
        tx.commit()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(conn: &Connection) -> u32 {
        conn.pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_migrations_apply_once() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(version(&conn), CURRENT_VERSION);

        conn.execute(
            "INSERT INTO session_values (key, value, updated_at) VALUES ('username', 'alice', '2025-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        run_migrations(&conn).unwrap();

        let kept: String = conn
            .query_row("SELECT value FROM session_values WHERE key = 'username'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(kept, "alice");
    }

    #[test]
    fn test_versions_are_ascending() {
        let versions: Vec<u32> = MIGRATIONS.iter().map(|(v, _, _)| *v).collect();
        assert!(versions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(versions.last().copied(), Some(CURRENT_VERSION));
    }
}
