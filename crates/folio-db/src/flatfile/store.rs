//! `content.json` / `edges.json` store.

use super::{read_json_or, read_json_strict, unix_millis, write_json_atomic};
use crate::pool::{DbError, DbResult};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;

const CONTENT_FILE: &str = "content.json";
const EDGE_FILE: &str = "edges.json";

/// One entry of `content.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: String,
    #[serde(rename = "type", default = "default_node_type")]
    pub node_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub position_x: f64,
    #[serde(default)]
    pub position_y: f64,
    #[serde(default, deserialize_with = "flag", serialize_with = "flag_out")]
    pub lock: bool,
    #[serde(default, deserialize_with = "flag", serialize_with = "flag_out")]
    pub fixed: bool,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub view: i64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn default_node_type() -> String {
    "custom".to_string()
}

/// Flags were written as `0`/`1` by older tooling and as booleans by newer.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    })
}

fn flag_out<S: serde::Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

/// One entry of `edges.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: String,
    pub source: String,
    pub target: String,
}

/// JSON-file backed content and edge lists.
///
/// Every mutation is a read-modify-write of a whole file, serialized by an
/// in-process lock. Other processes writing the same files are not coordinated.
pub struct FlatFileStore {
    data_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FlatFileStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed.
    pub fn open(data_dir: impl Into<PathBuf>) -> DbResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self {
            data_dir,
            write_lock: Mutex::new(()),
        })
    }

    fn content_path(&self) -> PathBuf {
        self.data_dir.join(CONTENT_FILE)
    }

    fn edge_path(&self) -> PathBuf {
        self.data_dir.join(EDGE_FILE)
    }

    fn lock(&self) -> DbResult<std::sync::MutexGuard<'_, ()>> {
        self.write_lock.lock().map_err(|_| DbError::Poisoned)
    }

    pub fn list_contents(&self) -> Vec<ContentRecord> {
        read_json_or(&self.content_path(), Vec::new())
    }

    pub fn list_edges(&self) -> Vec<EdgeRecord> {
        read_json_or(&self.edge_path(), Vec::new())
    }

    /// Current contents for a read-modify-write. Fails on a damaged file.
    fn load_contents(&self) -> DbResult<Vec<ContentRecord>> {
        Ok(read_json_strict(&self.content_path())?.unwrap_or_default())
    }

    fn load_edges(&self) -> DbResult<Vec<EdgeRecord>> {
        Ok(read_json_strict(&self.edge_path())?.unwrap_or_default())
    }

    pub fn get_content(&self, id: &str) -> DbResult<ContentRecord> {
        self.list_contents()
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| DbError::NotFound(format!("Content: {}", id)))
    }

    pub fn get_content_by_slug(&self, slug: &str) -> DbResult<ContentRecord> {
        self.list_contents()
            .into_iter()
            .find(|c| !c.slug.is_empty() && c.slug == slug)
            .ok_or_else(|| DbError::NotFound(format!("Content: {}", slug)))
    }

    pub fn slug_exists(&self, slug: &str) -> bool {
        self.list_contents().iter().any(|c| c.slug == slug)
    }

    /// Append a record. A fresh `content-<millis>` id is assigned.
    pub fn insert_content(&self, mut record: ContentRecord) -> DbResult<ContentRecord> {
        let _guard = self.lock()?;
        let mut contents = self.load_contents()?;

        if contents.iter().any(|c| c.slug == record.slug) {
            return Err(DbError::Conflict(format!("slug already in use: {}", record.slug)));
        }

        let mut stamp = unix_millis();
        while contents.iter().any(|c| c.id == format!("content-{}", stamp)) {
            stamp += 1;
        }
        record.id = format!("content-{}", stamp);

        contents.push(record.clone());
        write_json_atomic(&self.content_path(), &contents)?;
        Ok(record)
    }

    /// Apply `f` to the record with `id` and persist the result.
    pub fn update_content<F>(&self, id: &str, f: F) -> DbResult<ContentRecord>
    where
        F: FnOnce(&mut ContentRecord),
    {
        let _guard = self.lock()?;
        let mut contents = self.load_contents()?;
        let record = contents
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| DbError::NotFound(format!("Content: {}", id)))?;
        f(record);
        let updated = record.clone();
        write_json_atomic(&self.content_path(), &contents)?;
        Ok(updated)
    }

    /// Remove a record and every edge touching it. Returns the edge count removed.
    pub fn delete_content_cascade(&self, id: &str) -> DbResult<usize> {
        let _guard = self.lock()?;
        let mut contents = self.load_contents()?;
        let before = contents.len();
        contents.retain(|c| c.id != id);
        if contents.len() == before {
            return Err(DbError::NotFound(format!("Content: {}", id)));
        }

        let mut edges = self.load_edges()?;
        let edge_count = edges.len();
        edges.retain(|e| e.source != id && e.target != id);
        let removed = edge_count - edges.len();

        // Edges first: a crash in between leaves a node without edges rather
        // than edges pointing at a missing node.
        write_json_atomic(&self.edge_path(), &edges)?;
        write_json_atomic(&self.content_path(), &contents)?;
        Ok(removed)
    }

    /// Add an edge unless the pair is already connected.
    pub fn insert_edge(&self, id: &str, source: &str, target: &str) -> DbResult<EdgeRecord> {
        let _guard = self.lock()?;
        let mut edges = self.load_edges()?;
        if let Some(existing) = edges.iter().find(|e| e.source == source && e.target == target) {
            return Ok(existing.clone());
        }
        let edge = EdgeRecord {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
        };
        edges.push(edge.clone());
        write_json_atomic(&self.edge_path(), &edges)?;
        Ok(edge)
    }

    pub fn update_edge(&self, id: &str, source: &str, target: &str) -> DbResult<()> {
        let _guard = self.lock()?;
        let mut edges = self.load_edges()?;
        if edges.iter().any(|e| e.id != id && e.source == source && e.target == target) {
            return Err(DbError::Conflict(format!("edge {} -> {} already exists", source, target)));
        }
        let edge = edges
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| DbError::NotFound(format!("Edge: {}", id)))?;
        edge.source = source.to_string();
        edge.target = target.to_string();
        write_json_atomic(&self.edge_path(), &edges)
    }

    pub fn delete_edge(&self, id: &str) -> DbResult<()> {
        let _guard = self.lock()?;
        let mut edges = self.load_edges()?;
        let before = edges.len();
        edges.retain(|e| e.id != id);
        if edges.len() == before {
            return Err(DbError::NotFound(format!("Edge: {}", id)));
        }
        write_json_atomic(&self.edge_path(), &edges)
    }

    /// Remove every edge with `node_id` as either endpoint.
    pub fn delete_edges_touching(&self, node_id: &str) -> DbResult<usize> {
        let _guard = self.lock()?;
        let mut edges = self.load_edges()?;
        let before = edges.len();
        edges.retain(|e| e.source != node_id && e.target != node_id);
        let removed = before - edges.len();
        if removed > 0 {
            write_json_atomic(&self.edge_path(), &edges)?;
        }
        Ok(removed)
    }

    /// Overwrite `edges.json`. A repeated id or a repeated pair keeps its
    /// first occurrence.
    pub fn replace_edges(&self, edges: &[EdgeRecord]) -> DbResult<usize> {
        let _guard = self.lock()?;
        let mut kept: Vec<EdgeRecord> = Vec::with_capacity(edges.len());
        for edge in edges {
            let duplicate = kept
                .iter()
                .any(|e| e.id == edge.id || (e.source == edge.source && e.target == edge.target));
            if !duplicate {
                kept.push(edge.clone());
            }
        }
        write_json_atomic(&self.edge_path(), &kept)?;
        Ok(kept.len())
    }
}
