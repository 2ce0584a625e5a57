//! Dashboard grid layout, stored as an opaque JSON document.

use crate::error::FolioResult;
use folio_db::queries::layouts;
use folio_db::DbPool;
use serde_json::Value;

/// Key the dashboard layout is stored under.
pub const LAYOUT_KEY: &str = "dashboard-layouts";

/// The stored layout, or `None` when nothing has been saved yet.
pub fn get_layout(pool: &DbPool) -> FolioResult<Option<Value>> {
    match layouts::get_layout(pool, LAYOUT_KEY)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub fn save_layout(pool: &DbPool, layout: &Value) -> FolioResult<()> {
    let raw = serde_json::to_string(layout)?;
    layouts::put_layout(pool, LAYOUT_KEY, &raw)?;
    tracing::debug!(bytes = raw.len(), "Saved dashboard layout");
    Ok(())
}
