//! Folio storage layer.
//!
//! Two persistence backends live here: a SQLite database (`pool`, `migrations`,
//! `queries`) and a flat-file JSON store (`flatfile`) together with the task
//! directory of `.txt` documents.

pub mod flatfile;
pub mod migrations;
pub mod pool;
pub mod queries;

use std::path::Path;

pub use flatfile::{FlatFileStore, TaskDir};
pub use pool::{DbError, DbPool, DbResult};

/// Open (or create) the database at `path` and bring the schema up to date.
pub fn init_pool(path: &Path) -> DbResult<DbPool> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let pool = DbPool::open(path)?;
    migrations::run_migrations(&pool)?;
    tracing::debug!(path = %path.display(), "Database ready");
    Ok(pool)
}

/// In-memory database with the schema applied. Used by tests and dry runs.
pub fn init_memory_pool() -> DbResult<DbPool> {
    let pool = DbPool::in_memory()?;
    migrations::run_migrations(&pool)?;
    Ok(pool)
}
