//! Edge and graph-view models.

use crate::content::{ContentNode, NodeOrigin, Position};
use folio_db::flatfile::EdgeRecord;
use folio_db::queries::edges::EdgeRow;
use serde::{Deserialize, Serialize};

/// A connection between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl Edge {
    /// Edge with the canonical `<source>-<target>` id.
    pub fn between(source: &str, target: &str) -> Self {
        Self {
            id: format!("{}-{}", source, target),
            source: source.to_string(),
            target: target.to_string(),
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }

    pub fn from_row(row: EdgeRow) -> Self {
        Self {
            id: row.id,
            source: row.source,
            target: row.target,
        }
    }

    pub fn to_row(&self) -> EdgeRow {
        EdgeRow {
            id: self.id.clone(),
            source: self.source.clone(),
            target: self.target.clone(),
        }
    }

    pub fn from_record(record: EdgeRecord) -> Self {
        Self {
            id: record.id,
            source: record.source,
            target: record.target,
        }
    }

    pub fn to_record(&self) -> EdgeRecord {
        EdgeRecord {
            id: self.id.clone(),
            source: self.source.clone(),
            target: self.target.clone(),
        }
    }
}

/// The payload the canvas renders: every node plus every edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphView {
    pub content_data: Vec<GraphNode>,
    pub edge_data: Vec<Edge>,
    pub static_count: usize,
    pub files_count: usize,
}

/// A node in the shape the graph widget expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub data: NodeData,
    pub position: Position,
}

/// Display data attached to a graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub date: String,
    pub content: String,
    pub lock: bool,
    pub fixed: bool,
    pub slug: String,
    pub keywords: String,
    pub view: i64,
    pub origin: NodeOrigin,
}

impl From<ContentNode> for GraphNode {
    fn from(node: ContentNode) -> Self {
        Self {
            id: node.id.clone(),
            node_type: "custom".to_string(),
            position: node.position,
            data: NodeData {
                id: node.id,
                title: node.title,
                subtitle: node.subtitle,
                date: node.created_at,
                content: node.content,
                lock: node.locked,
                fixed: node.fixed,
                slug: node.slug,
                keywords: node.keywords,
                view: node.view,
                origin: node.origin,
            },
        }
    }
}

/// One entry of a batch position update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub position_x: f64,
    pub position_y: f64,
}

impl From<PositionUpdate> for Position {
    fn from(update: PositionUpdate) -> Self {
        Position::new(update.position_x, update.position_y)
    }
}

impl From<Position> for PositionUpdate {
    fn from(position: Position) -> Self {
        Self {
            position_x: position.x,
            position_y: position.y,
        }
    }
}

/// What a batch position update touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub file_update_count: usize,
    pub content_update_count: usize,
}

impl BatchOutcome {
    pub fn total(&self) -> usize {
        self.file_update_count + self.content_update_count
    }
}
