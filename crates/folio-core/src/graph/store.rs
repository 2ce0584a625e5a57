//! Storage seam for content nodes and edges.

use super::model::Edge;
use crate::content::{ContentNode, ContentPatch, NewContent, Position};
use crate::error::FolioResult;

/// Backend holding stored content nodes and all edges.
///
/// Task-file nodes are not part of a store; [`super::Graph`] merges them in.
/// Implementations are synchronous; async callers go through
/// `spawn_blocking` or accept the short block.
pub trait GraphStore: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    fn list_nodes(&self) -> FolioResult<Vec<ContentNode>>;

    fn get_node(&self, id: &str) -> FolioResult<ContentNode>;

    fn find_by_slug(&self, slug: &str) -> FolioResult<ContentNode>;

    fn slug_exists(&self, slug: &str) -> FolioResult<bool>;

    /// Persist a node with an already resolved slug and position.
    fn insert_node(&self, new: &NewContent, slug: &str, position: Position) -> FolioResult<ContentNode>;

    fn update_body(&self, id: &str, patch: &ContentPatch) -> FolioResult<ContentNode>;

    fn set_position(&self, id: &str, position: Position) -> FolioResult<()>;

    /// Delete a node and its incident edges. Returns the edge count removed.
    fn delete_node(&self, id: &str) -> FolioResult<usize>;

    fn increment_views(&self, id: &str) -> FolioResult<i64>;

    fn list_edges(&self) -> FolioResult<Vec<Edge>>;

    /// Store an edge; an existing edge for the same pair wins.
    fn insert_edge(&self, edge: &Edge) -> FolioResult<Edge>;

    fn update_edge(&self, edge: &Edge) -> FolioResult<()>;

    fn delete_edge(&self, id: &str) -> FolioResult<()>;

    /// Drop every edge touching `node_id`. Returns the count removed.
    fn delete_edges_touching(&self, node_id: &str) -> FolioResult<usize>;

    fn replace_edges(&self, edges: &[Edge]) -> FolioResult<usize>;
}
