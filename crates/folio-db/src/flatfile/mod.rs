//! Flat-file persistence: JSON lists on disk plus a directory of task files.

mod store;
mod tasks;

pub use store::{ContentRecord, EdgeRecord, FlatFileStore};
pub use tasks::{TaskDir, TaskDocument, TaskFileInfo};

use crate::pool::DbResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Read a JSON document, treating a missing or unparsable file as `default`.
///
/// For display only; writers go through [`read_json_strict`].
pub(crate) fn read_json_or<T: DeserializeOwned>(path: &Path, default: T) -> T {
    match read_json_strict(path) {
        Ok(Some(value)) => value,
        Ok(None) => default,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to load JSON file");
            default
        }
    }
}

/// Read a JSON document, `None` when the file does not exist.
///
/// A file that cannot be read or parsed is an error, so a read-modify-write
/// never replaces a damaged file with a partial list.
pub(crate) fn read_json_strict<T: DeserializeOwned>(path: &Path) -> DbResult<Option<T>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&raw)?))
}

/// Write `value` as pretty JSON through a temp file and a rename.
pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> DbResult<()> {
    let body = serde_json::to_string_pretty(value)?;
    write_atomic(path, body.as_bytes())
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> DbResult<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Milliseconds since the Unix epoch, used for generated ids.
pub(crate) fn unix_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
