//! The content graph: stored nodes, task-file nodes and the edges between them.

mod flatfile;
pub mod model;
mod sqlite;
pub mod store;

pub use model::{BatchOutcome, Edge, GraphNode, GraphView, NodeData, PositionUpdate};
pub use store::GraphStore;

use crate::content::{slugify, unique_slug, ContentNode, ContentPatch, NewContent, Position};
use crate::error::{FolioError, FolioResult};
use crate::files;
use folio_db::TaskDir;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Graph service over a [`GraphStore`] plus the task directory.
///
/// Node ids starting with `file-` address task files; every other id goes to
/// the store. Edges always live in the store, whatever their endpoints.
#[derive(Clone)]
pub struct Graph {
    store: Arc<dyn GraphStore>,
    tasks: TaskDir,
}

impl Graph {
    pub fn new(store: Arc<dyn GraphStore>, tasks: TaskDir) -> Self {
        Self { store, tasks }
    }

    pub fn store(&self) -> &dyn GraphStore {
        self.store.as_ref()
    }

    pub fn tasks(&self) -> &TaskDir {
        &self.tasks
    }

    /// Every node and edge, stored nodes first.
    pub fn view(&self) -> FolioResult<GraphView> {
        let stored = self.store.list_nodes()?;
        let file_nodes = files::list_file_nodes(&self.tasks)?;
        let edges = self.store.list_edges()?;

        info!(
            backend = self.store.backend(),
            stored = stored.len(),
            files = file_nodes.len(),
            edges = edges.len(),
            "Assembled graph view"
        );

        let static_count = stored.len();
        let files_count = file_nodes.len();
        Ok(GraphView {
            content_data: stored
                .into_iter()
                .chain(file_nodes)
                .map(GraphNode::from)
                .collect(),
            edge_data: edges,
            static_count,
            files_count,
        })
    }

    pub fn node(&self, id: &str) -> FolioResult<ContentNode> {
        match files::file_name_for_node(id) {
            Some(file_name) => files::load_file_node(&self.tasks, &file_name),
            None => self.store.get_node(id).map_err(|e| not_found_as_content(e, id)),
        }
    }

    /// The id a node is stored under, or `None` when it does not exist.
    /// Edges are always written with this id so a node delete finds them.
    fn canonical_id(&self, id: &str) -> FolioResult<Option<String>> {
        match self.node(id) {
            Ok(node) => Ok(Some(node.id)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn resolve_endpoint(&self, id: &str) -> FolioResult<String> {
        self.canonical_id(id)?
            .ok_or_else(|| FolioError::ContentNotFound(id.to_string()))
    }

    /// Check an edge pair without writing anything.
    pub fn check_connectable(&self, source: &str, target: &str) -> FolioResult<(String, String)> {
        if source.is_empty() || target.is_empty() {
            return Err(FolioError::validation("source and target are required"));
        }
        if source == target {
            return Err(FolioError::validation("a node cannot connect to itself"));
        }
        let source = self.resolve_endpoint(source)?;
        let target = self.resolve_endpoint(target)?;
        if source == target {
            return Err(FolioError::validation("a node cannot connect to itself"));
        }
        Ok((source, target))
    }

    /// Resolve a path segment that may be an id or a slug.
    pub fn lookup(&self, key: &str) -> FolioResult<ContentNode> {
        match self.node(key) {
            Ok(node) => Ok(node),
            Err(e) if e.is_not_found() => self
                .store
                .find_by_slug(key)
                .map_err(|e| not_found_as_content(e, key)),
            Err(e) => Err(e),
        }
    }

    /// Create a stored node. The slug is made unique; the position defaults
    /// to a random point.
    pub fn create_node(&self, new: &NewContent) -> FolioResult<ContentNode> {
        if new.title.trim().is_empty() {
            return Err(FolioError::validation("title is required"));
        }

        let base = match new.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(explicit) => slugify(explicit),
            None => slugify(&new.title),
        };
        let slug = unique_slug(&base, |candidate| self.store.slug_exists(candidate))?;

        let position = new
            .position
            .filter(Position::is_finite)
            .unwrap_or_else(Position::random);

        let node = self.store.insert_node(new, &slug, position)?;
        info!(id = %node.id, slug = %node.slug, "Created content node");
        Ok(node)
    }

    pub fn update_node(&self, id: &str, patch: &ContentPatch) -> FolioResult<ContentNode> {
        if patch.is_empty() {
            return Err(FolioError::validation("nothing to update"));
        }
        if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(FolioError::validation("title cannot be empty"));
        }

        match files::file_name_for_node(id) {
            Some(file_name) => files::update_file_node(&self.tasks, &file_name, patch),
            None => self
                .store
                .update_body(id, patch)
                .map_err(|e| not_found_as_content(e, id)),
        }
    }

    pub fn move_node(&self, id: &str, position: Position) -> FolioResult<()> {
        if !position.is_finite() {
            return Err(FolioError::validation("position must be finite"));
        }
        match files::file_name_for_node(id) {
            Some(file_name) => files::move_file_node(&self.tasks, &file_name, position),
            None => self
                .store
                .set_position(id, position)
                .map_err(|e| not_found_as_content(e, id)),
        }
    }

    /// Apply many position updates. Each entry stands alone: failures are
    /// logged and skipped.
    pub fn move_nodes(&self, updates: &BTreeMap<String, PositionUpdate>) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for (id, update) in updates {
            match self.move_node(id, (*update).into()) {
                Ok(()) if id.starts_with(files::FILE_NODE_PREFIX) => outcome.file_update_count += 1,
                Ok(()) => outcome.content_update_count += 1,
                Err(e) => warn!(node = %id, error = %e, "Skipped position update"),
            }
        }
        debug!(
            files = outcome.file_update_count,
            contents = outcome.content_update_count,
            requested = updates.len(),
            "Batch positions saved"
        );
        outcome
    }

    /// Delete a node and its edges. Returns the edge count removed.
    pub fn delete_node(&self, id: &str) -> FolioResult<usize> {
        let removed = match files::file_name_for_node(id) {
            Some(file_name) => {
                files::remove_file_node(&self.tasks, &file_name)?;
                self.store.delete_edges_touching(id)?
            }
            None => self
                .store
                .delete_node(id)
                .map_err(|e| not_found_as_content(e, id))?,
        };
        info!(node = %id, edges_removed = removed, "Deleted content node");
        Ok(removed)
    }

    /// Count a view. Task-file nodes are not tracked and report 0.
    pub fn record_view(&self, id: &str) -> FolioResult<i64> {
        match files::file_name_for_node(id) {
            Some(file_name) => {
                files::load_file_node(&self.tasks, &file_name)?;
                Ok(0)
            }
            None => self
                .store
                .increment_views(id)
                .map_err(|e| not_found_as_content(e, id)),
        }
    }

    pub fn edges(&self) -> FolioResult<Vec<Edge>> {
        self.store.list_edges()
    }

    /// Connect two existing nodes. Connecting an already-connected pair
    /// returns the existing edge.
    pub fn connect(&self, source: &str, target: &str) -> FolioResult<Edge> {
        let (source, target) = self.check_connectable(source, target)?;
        let edge = self.store.insert_edge(&Edge::between(&source, &target))?;
        info!(edge = %edge.id, %source, %target, "Connected nodes");
        Ok(edge)
    }

    /// Point an existing edge at new endpoints.
    pub fn update_edge(&self, edge: &Edge) -> FolioResult<()> {
        let resolved = Edge {
            id: edge.id.clone(),
            source: self.resolve_endpoint(&edge.source)?,
            target: self.resolve_endpoint(&edge.target)?,
        };
        self.store.update_edge(&resolved)
    }

    pub fn disconnect(&self, edge_id: &str) -> FolioResult<()> {
        self.store.delete_edge(edge_id)?;
        info!(edge = %edge_id, "Disconnected nodes");
        Ok(())
    }

    /// Replace every edge with `edges` (bulk save from the canvas).
    ///
    /// Edges naming a missing node are dropped with a warning.
    pub fn replace_edges(&self, edges: &[Edge]) -> FolioResult<usize> {
        let mut kept = Vec::with_capacity(edges.len());
        for edge in edges {
            match (self.canonical_id(&edge.source)?, self.canonical_id(&edge.target)?) {
                (Some(source), Some(target)) => kept.push(Edge {
                    id: edge.id.clone(),
                    source,
                    target,
                }),
                _ => warn!(edge = %edge.id, "Dropping edge with a missing endpoint"),
            }
        }
        let stored = self.store.replace_edges(&kept)?;
        info!(count = stored, "Replaced edges");
        Ok(stored)
    }
}

/// Store lookups report a generic database `NotFound`; name the content id.
fn not_found_as_content(e: FolioError, id: &str) -> FolioError {
    match e {
        FolioError::Database(folio_db::DbError::NotFound(_)) => FolioError::ContentNotFound(id.to_string()),
        e => e,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::NodeOrigin;
    use folio_db::FlatFileStore;
    use tempfile::TempDir;

    fn sqlite_graph() -> (TempDir, Graph) {
        let dir = TempDir::new().unwrap();
        let pool = folio_db::init_memory_pool().unwrap();
        let tasks = TaskDir::open(dir.path().join("task")).unwrap();
        (dir, Graph::new(Arc::new(pool), tasks))
    }

    fn flatfile_graph() -> (TempDir, Graph) {
        let dir = TempDir::new().unwrap();
        let store = FlatFileStore::open(dir.path().join("data")).unwrap();
        let tasks = TaskDir::open(dir.path().join("task")).unwrap();
        (dir, Graph::new(Arc::new(store), tasks))
    }

    fn post(title: &str) -> NewContent {
        NewContent {
            title: title.to_string(),
            content: format!("# {}", title),
            position: Some(Position::new(10.0, 20.0)),
            ..Default::default()
        }
    }

    fn both() -> Vec<(TempDir, Graph)> {
        vec![sqlite_graph(), flatfile_graph()]
    }

    #[test]
    fn test_create_and_lookup() {
        for (_dir, graph) in both() {
            let node = graph.create_node(&post("Hello World")).unwrap();
            assert_eq!(node.slug, "hello-world");
            assert_eq!(node.position, Position::new(10.0, 20.0));

            assert_eq!(graph.lookup(&node.id).unwrap().id, node.id);
            assert_eq!(graph.lookup("hello-world").unwrap().id, node.id);
            assert!(graph.lookup("missing").unwrap_err().is_not_found());
        }
    }

    #[test]
    fn test_duplicate_titles_get_numbered_slugs() {
        for (_dir, graph) in both() {
            graph.create_node(&post("Same")).unwrap();
            let second = graph.create_node(&post("Same")).unwrap();
            let third = graph.create_node(&post("Same")).unwrap();
            assert_eq!(second.slug, "same-2");
            assert_eq!(third.slug, "same-3");
        }
    }

    #[test]
    fn test_create_requires_title() {
        let (_dir, graph) = sqlite_graph();
        let err = graph.create_node(&post("   ")).unwrap_err();
        assert!(matches!(err, FolioError::ValidationError(_)));
    }

    #[test]
    fn test_missing_position_is_randomized() {
        let (_dir, graph) = sqlite_graph();
        let node = graph
            .create_node(&NewContent {
                title: "Floating".into(),
                ..Default::default()
            })
            .unwrap();
        assert!((100.0..900.0).contains(&node.position.x));
    }

    #[test]
    fn test_update_patch_keeps_untouched_fields() {
        for (_dir, graph) in both() {
            let node = graph.create_node(&post("Draft")).unwrap();
            let updated = graph
                .update_node(
                    &node.id,
                    &ContentPatch {
                        content: Some("final text".into()),
                        ..Default::default()
                    },
                )
                .unwrap();
            assert_eq!(updated.title, "Draft");
            assert_eq!(updated.content, "final text");
            assert_eq!(updated.slug, node.slug);
        }
    }

    #[test]
    fn test_connect_requires_existing_endpoints() {
        for (_dir, graph) in both() {
            let a = graph.create_node(&post("A")).unwrap();
            let err = graph.connect(&a.id, "404").unwrap_err();
            assert!(matches!(err, FolioError::ContentNotFound(ref id) if id == "404"));
            assert!(graph.edges().unwrap().is_empty());
        }
    }

    #[test]
    fn test_connect_is_idempotent() {
        for (_dir, graph) in both() {
            let a = graph.create_node(&post("A")).unwrap();
            let b = graph.create_node(&post("B")).unwrap();
            let first = graph.connect(&a.id, &b.id).unwrap();
            let second = graph.connect(&a.id, &b.id).unwrap();
            assert_eq!(first, second);
            assert_eq!(first.id, format!("{}-{}", a.id, b.id));
            assert_eq!(graph.edges().unwrap().len(), 1);
        }
    }

    #[test]
    fn test_delete_node_removes_edges() {
        for (_dir, graph) in both() {
            let a = graph.create_node(&post("A")).unwrap();
            let b = graph.create_node(&post("B")).unwrap();
            let c = graph.create_node(&post("C")).unwrap();
            graph.connect(&a.id, &b.id).unwrap();
            graph.connect(&c.id, &a.id).unwrap();
            graph.connect(&b.id, &c.id).unwrap();

            assert_eq!(graph.delete_node(&a.id).unwrap(), 2);
            let edges = graph.edges().unwrap();
            assert_eq!(edges.len(), 1);
            assert!(!edges[0].touches(&a.id));
            assert!(graph.node(&a.id).unwrap_err().is_not_found());
        }
    }

    #[test]
    fn test_edges_to_an_id_alias_go_with_the_node() {
        let (_dir, graph) = sqlite_graph();
        let a = graph.create_node(&post("A")).unwrap();
        let b = graph.create_node(&post("B")).unwrap();
        let alias = format!("0{}", a.id);

        assert!(graph.connect(&alias, &b.id).unwrap_err().is_not_found());
        graph
            .replace_edges(&[Edge {
                id: "manual".into(),
                source: alias.clone(),
                target: b.id.clone(),
            }])
            .unwrap();
        assert!(graph.edges().unwrap().is_empty());

        graph.connect(&a.id, &b.id).unwrap();
        assert_eq!(graph.delete_node(&a.id).unwrap(), 1);
        assert!(graph.edges().unwrap().is_empty());
    }

    #[test]
    fn test_check_connectable_writes_nothing() {
        for (_dir, graph) in both() {
            let a = graph.create_node(&post("A")).unwrap();
            let b = graph.create_node(&post("B")).unwrap();
            assert_eq!(
                graph.check_connectable(&a.id, &b.id).unwrap(),
                (a.id.clone(), b.id.clone())
            );
            assert!(graph.check_connectable(&a.id, "ghost").unwrap_err().is_not_found());
            assert!(graph.edges().unwrap().is_empty());
        }
    }

    #[test]
    fn test_view_merges_file_nodes() {
        for (_dir, graph) in both() {
            let a = graph.create_node(&post("A")).unwrap();
            std::fs::write(
                graph.tasks().root().join("todo.txt"),
                r#"{"title":"Todo","content":"x","position_x":300,"position_y":400}"#,
            )
            .unwrap();
            graph.connect(&a.id, "file-todo").unwrap();

            let view = graph.view().unwrap();
            assert_eq!(view.static_count, 1);
            assert_eq!(view.files_count, 1);
            assert_eq!(view.content_data.len(), 2);
            assert_eq!(view.edge_data.len(), 1);

            let file = &view.content_data[1];
            assert_eq!(file.id, "file-todo");
            assert_eq!(file.node_type, "custom");
            assert_eq!(file.data.origin, NodeOrigin::File);
            assert_eq!(file.position, Position::new(300.0, 400.0));
        }
    }

    #[test]
    fn test_batch_positions_count_by_origin() {
        for (_dir, graph) in both() {
            let a = graph.create_node(&post("A")).unwrap();
            std::fs::write(graph.tasks().root().join("n.txt"), r#"{"title":"n"}"#).unwrap();

            let mut updates = BTreeMap::new();
            updates.insert(a.id.clone(), PositionUpdate { position_x: 1.0, position_y: 2.0 });
            updates.insert("file-n".to_string(), PositionUpdate { position_x: 3.0, position_y: 4.0 });
            updates.insert("file-ghost".to_string(), PositionUpdate { position_x: 5.0, position_y: 6.0 });
            updates.insert("999999".to_string(), PositionUpdate { position_x: 7.0, position_y: 8.0 });

            let outcome = graph.move_nodes(&updates);
            assert_eq!(outcome.content_update_count, 1);
            assert_eq!(outcome.file_update_count, 1);

            assert_eq!(graph.node(&a.id).unwrap().position, Position::new(1.0, 2.0));
            assert_eq!(graph.node("file-n").unwrap().position, Position::new(3.0, 4.0));
        }
    }

    #[test]
    fn test_views_are_counted_for_stored_nodes_only() {
        for (_dir, graph) in both() {
            let a = graph.create_node(&post("A")).unwrap();
            assert_eq!(graph.record_view(&a.id).unwrap(), 1);
            assert_eq!(graph.record_view(&a.id).unwrap(), 2);

            std::fs::write(graph.tasks().root().join("n.txt"), r#"{"title":"n"}"#).unwrap();
            assert_eq!(graph.record_view("file-n").unwrap(), 0);
            assert!(graph.record_view("file-missing").unwrap_err().is_not_found());
        }
    }

    #[test]
    fn test_replace_edges_drops_dangling() {
        for (_dir, graph) in both() {
            let a = graph.create_node(&post("A")).unwrap();
            let b = graph.create_node(&post("B")).unwrap();
            let stored = graph
                .replace_edges(&[Edge::between(&a.id, &b.id), Edge::between(&a.id, "ghost")])
                .unwrap();
            assert_eq!(stored, 1);
        }
    }

    #[test]
    fn test_delete_file_node() {
        for (_dir, graph) in both() {
            let a = graph.create_node(&post("A")).unwrap();
            std::fs::write(graph.tasks().root().join("n.txt"), r#"{"title":"n"}"#).unwrap();
            graph.connect("file-n", &a.id).unwrap();

            assert_eq!(graph.delete_node("file-n").unwrap(), 1);
            assert!(!graph.tasks().exists("n.txt"));
        }
    }
}
