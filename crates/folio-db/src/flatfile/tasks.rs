//! Directory of `.txt` task documents.
//!
//! Each file holds a pretty-printed JSON object. Files dropped into the
//! directory by other tools may be invalid JSON; readers must cope with that.

use super::write_atomic;
use crate::pool::{DbError, DbResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const EXTENSION: &str = ".txt";

/// Parsed task document. Unknown fields survive a read/write cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_x: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_y: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TaskDocument {
    /// Both coordinates, when both are JSON numbers.
    pub fn position(&self) -> Option<(f64, f64)> {
        let x = self.position_x.as_ref().and_then(Value::as_f64)?;
        let y = self.position_y.as_ref().and_then(Value::as_f64)?;
        Some((x, y))
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.position_x = Some(Value::from(x));
        self.position_y = Some(Value::from(y));
    }
}

/// Listing entry with filesystem metadata.
#[derive(Debug, Clone)]
pub struct TaskFileInfo {
    pub name: String,
    pub size: u64,
    pub created: Option<SystemTime>,
    pub modified: Option<SystemTime>,
}

/// A directory of task files.
#[derive(Debug, Clone)]
pub struct TaskDir {
    root: PathBuf,
}

impl TaskDir {
    /// Open the directory, creating it if needed.
    pub fn open(root: impl Into<PathBuf>) -> DbResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `name` looks like a task file (`*.txt`, not hidden).
    pub fn is_task_file(name: &str) -> bool {
        name.ends_with(EXTENSION) && !name.starts_with('.')
    }

    /// File name without the `.txt` extension.
    pub fn stem(name: &str) -> &str {
        name.strip_suffix(EXTENSION).unwrap_or(name)
    }

    /// Resolve `name` inside the directory, rejecting anything that could
    /// escape it.
    pub fn resolve(&self, name: &str) -> DbResult<PathBuf> {
        let valid = Self::is_task_file(name)
            && name.len() > EXTENSION.len()
            && !name.contains(['/', '\\', '\0'])
            && !name.contains("..");
        if !valid {
            return Err(DbError::InvalidFileName(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.resolve(name).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Names of all task files, sorted.
    pub fn list(&self) -> DbResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if Self::is_task_file(name) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn info(&self, name: &str) -> DbResult<TaskFileInfo> {
        let meta = std::fs::metadata(self.resolve(name)?).map_err(|e| not_found_io(name, e))?;
        Ok(TaskFileInfo {
            name: name.to_string(),
            size: meta.len(),
            created: meta.created().ok(),
            modified: meta.modified().ok(),
        })
    }

    /// Raw file contents.
    pub fn read_raw(&self, name: &str) -> DbResult<String> {
        std::fs::read_to_string(self.resolve(name)?).map_err(|e| not_found_io(name, e))
    }

    /// Parse the file as a task document.
    ///
    /// Returns `Serialization` for invalid JSON so callers can fall back.
    pub fn read_document(&self, name: &str) -> DbResult<TaskDocument> {
        let raw = self.read_raw(name)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write any serializable document (normally a [`TaskDocument`]) as pretty JSON.
    pub fn write_document<T: Serialize + ?Sized>(&self, name: &str, doc: &T) -> DbResult<()> {
        let body = serde_json::to_string_pretty(doc)?;
        write_atomic(&self.resolve(name)?, body.as_bytes())
    }

    pub fn remove(&self, name: &str) -> DbResult<()> {
        std::fs::remove_file(self.resolve(name)?).map_err(|e| not_found_io(name, e))
    }
}

fn not_found_io(name: &str, e: std::io::Error) -> DbError {
    if e.kind() == std::io::ErrorKind::NotFound {
        DbError::NotFound(format!("Task file: {}", name))
    } else {
        DbError::Io(e)
    }
}
