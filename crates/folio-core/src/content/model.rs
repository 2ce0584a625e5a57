//! Content node models.

use folio_db::flatfile::ContentRecord;
use folio_db::queries::contents::ContentRow;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A point on the graph canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Random whole-number point in x 100..900, y 100..700.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            x: f64::from(rng.gen_range(100..900i32)),
            y: f64::from(rng.gen_range(100..700i32)),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Where a node lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeOrigin {
    /// Database row or `content.json` entry.
    Stored,
    /// `.txt` document in the task directory.
    File,
}

/// A content item on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub content: String,
    pub slug: String,
    pub keywords: String,
    pub view: i64,
    pub locked: bool,
    pub fixed: bool,
    pub position: Position,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub origin: NodeOrigin,
}

impl ContentNode {
    /// Create from database row.
    pub fn from_row(row: ContentRow) -> Self {
        Self {
            id: row.id.to_string(),
            title: row.title,
            subtitle: row.subtitle,
            content: row.body,
            slug: row.slug,
            keywords: row.keywords,
            view: row.views,
            locked: row.locked,
            fixed: row.pinned,
            position: Position::new(row.position_x, row.position_y),
            created_at: row.created_at,
            updated_at: Some(row.updated_at),
            origin: NodeOrigin::Stored,
        }
    }

    /// Create from a `content.json` entry.
    pub fn from_record(record: ContentRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            subtitle: record.subtitle,
            content: record.content,
            slug: record.slug,
            keywords: record.keyword,
            view: record.view,
            locked: record.lock,
            fixed: record.fixed,
            position: Position::new(record.position_x, record.position_y),
            created_at: record.created_at,
            updated_at: record.updated_at,
            origin: NodeOrigin::Stored,
        }
    }

    /// Keywords split on commas, trimmed, empties dropped.
    pub fn keyword_list(&self) -> Vec<&str> {
        self.keywords
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .collect()
    }
}

/// Input for a new content node.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewContent {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub keywords: String,
    /// Explicit slug; derived from the title when absent.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub view: i64,
    /// Creation timestamp supplied by the editor.
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Partial update of the editable text fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentPatch {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub content: Option<String>,
    pub keywords: Option<String>,
}

impl ContentPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.subtitle.is_none()
            && self.content.is_none()
            && self.keywords.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_position_bounds() {
        for _ in 0..200 {
            let p = Position::random();
            assert!((100.0..900.0).contains(&p.x));
            assert!((100.0..700.0).contains(&p.y));
            assert_eq!(p.x.fract(), 0.0);
        }
    }

    #[test]
    fn test_keyword_list() {
        let node = ContentNode {
            id: "1".into(),
            title: "t".into(),
            subtitle: None,
            content: String::new(),
            slug: "t".into(),
            keywords: " rust, ,axum ,".into(),
            view: 0,
            locked: false,
            fixed: false,
            position: Position::default(),
            created_at: String::new(),
            updated_at: None,
            origin: NodeOrigin::Stored,
        };
        assert_eq!(node.keyword_list(), vec!["rust", "axum"]);
    }
}
