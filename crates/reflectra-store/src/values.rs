//! CRUD operations for [`SessionValue`] rows.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::SessionValue;

impl Database {
    /// Insert or overwrite the value stored under `key`.
    pub fn put_value(&self, key: &str, value: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO session_values (key, value, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )?;
            Ok(())
        })
    }

    /// Write several values in one transaction sharing one timestamp.
    pub fn put_values(&self, entries: &[(&str, &str)]) -> Result<()> {
        self.with_conn(|conn| {
            let now = Utc::now().to_rfc3339();
            let tx = conn.unchecked_transaction()?;
            for (key, value) in entries {
                tx.execute(
                    "INSERT INTO session_values (key, value, updated_at)
                     VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                    updated_at = excluded.updated_at",
                    params![key, value, now],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    pub fn get_value(&self, key: &str) -> Result<Option<SessionValue>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT key, value, updated_at FROM session_values WHERE key = ?1",
                    params![key],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                        ))
                    },
                )
                .optional()?;

            let Some((key, value, ts)) = row else {
                return Ok(None);
            };

            let updated_at = DateTime::parse_from_rfc3339(&ts)
                .map_err(|source| StoreError::BadTimestamp {
                    key: key.clone(),
                    source,
                })?
                .with_timezone(&Utc);
            Ok(Some(SessionValue {
                key,
                value,
                updated_at,
            }))
        })
    }

    /// Delete every key in `keys` in one transaction. Returns the number of
    /// rows removed.
    pub fn delete_values(&self, keys: &[&str]) -> Result<usize> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            let mut removed = 0;
            for key in keys {
                removed += tx.execute("DELETE FROM session_values WHERE key = ?1", params![key])?;
            }
            tx.commit()?;
            Ok(removed)
        })
    }
}
