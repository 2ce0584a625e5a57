//! Key/value storage for dashboard layouts.

use crate::pool::{DbError, DbPool, DbResult};
use rusqlite::{params, OptionalExtension};

/// Load the raw JSON stored under `key`.
pub fn get_layout(pool: &DbPool, key: &str) -> DbResult<Option<String>> {
    pool.with_conn(|conn| {
        conn.query_row("SELECT value FROM layouts WHERE key = ?1", params![key], |row| row.get(0))
            .optional()
            .map_err(DbError::from)
    })
}

/// Store raw JSON under `key`, replacing any previous value.
pub fn put_layout(pool: &DbPool, key: &str, value: &str) -> DbResult<()> {
    pool.with_conn(|conn| {
        conn.execute(
            "INSERT INTO layouts (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')",
            params![key, value],
        )?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_upsert() {
        let pool = crate::init_memory_pool().unwrap();
        assert!(get_layout(&pool, "dashboard").unwrap().is_none());

        put_layout(&pool, "dashboard", r#"{"lg":[]}"#).unwrap();
        put_layout(&pool, "dashboard", r#"{"lg":[{"i":"a"}]}"#).unwrap();

        assert_eq!(get_layout(&pool, "dashboard").unwrap().unwrap(), r#"{"lg":[{"i":"a"}]}"#);
    }
}
