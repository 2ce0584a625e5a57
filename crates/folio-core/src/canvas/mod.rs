//! Client-side canvas state with optimistic edits and debounced persistence.
//!
//! Changes are applied to the in-memory graph first. Drags are coalesced by a
//! [`Debouncer`] and written as one batch once the pointer settles; edge
//! changes are written right away. A failed write is logged and the local
//! state is kept, so the last write wins. The write result is still handed
//! back to callers that need to report it.

pub mod debounce;
mod http;
mod sink;

pub use debounce::{Debouncer, DEFAULT_WINDOW};
pub use http::HttpSink;
pub use sink::{CanvasSink, StoreSink};

use crate::content::Position;
use crate::error::FolioResult;
use crate::graph::{BatchOutcome, Edge, GraphNode, GraphView};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

/// One change reported by the graph widget.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeChange {
    /// A node moved. `dragging` is set while the user is holding it.
    Position {
        id: String,
        position: Option<Position>,
        dragging: bool,
    },
    /// A node was removed from the view.
    Remove { id: String },
}

pub struct Canvas {
    nodes: Vec<GraphNode>,
    edges: Vec<Edge>,
    sink: Arc<dyn CanvasSink>,
    positions: Debouncer<String, Position>,
    last_save: Arc<Mutex<Option<FolioResult<BatchOutcome>>>>,
}

impl Canvas {
    /// Build a canvas over `view`. Must be called inside a tokio runtime.
    pub fn new(view: GraphView, sink: Arc<dyn CanvasSink>, window: Duration) -> Self {
        let flush_sink = sink.clone();
        let last_save = Arc::new(Mutex::new(None));
        let report = last_save.clone();
        let positions = Debouncer::new(window, move |batch| {
            let sink = flush_sink.clone();
            let report = report.clone();
            async move {
                let requested = batch.len();
                let result = sink.save_positions(batch).await;
                match &result {
                    Ok(outcome) if outcome.total() < requested => warn!(
                        requested,
                        saved = outcome.total(),
                        "Some node positions were not persisted"
                    ),
                    Ok(outcome) => debug!(
                        requested,
                        saved = outcome.total(),
                        "Persisted node positions"
                    ),
                    Err(e) => warn!(requested, error = %e, "Failed to persist node positions"),
                }
                if let Ok(mut slot) = report.lock() {
                    *slot = Some(result);
                }
            }
        });

        Self {
            nodes: view.content_data,
            edges: view.edge_data,
            sink,
            positions,
            last_save,
        }
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Apply widget changes locally. Returns how many were queued for
    /// persistence; only in-progress drags with a position are.
    pub fn apply_node_changes(&mut self, changes: Vec<NodeChange>) -> usize {
        let mut queued = 0;
        for change in changes {
            match change {
                NodeChange::Position {
                    id,
                    position,
                    dragging,
                } => {
                    let Some(position) = position else { continue };
                    let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
                        continue;
                    };
                    node.position = position;
                    if dragging {
                        self.positions.push(id, position);
                        queued += 1;
                    }
                }
                NodeChange::Remove { id } => {
                    self.nodes.retain(|n| n.id != id);
                    self.edges.retain(|e| !e.touches(&id));
                }
            }
        }
        queued
    }

    /// Connect two nodes locally, then persist. The local edge stays even
    /// when the write fails; the error is returned for callers that report it.
    pub async fn connect(&mut self, source: &str, target: &str) -> FolioResult<Edge> {
        let edge = Edge::between(source, target);
        if !self.edges.iter().any(|e| e.source == source && e.target == target) {
            self.edges.push(edge.clone());
        }

        match self.sink.add_edge(source, target).await {
            Ok(stored) => {
                debug!(edge = %stored.id, "Persisted edge");
                Ok(stored)
            }
            Err(e) => {
                warn!(edge = %edge.id, error = %e, "Failed to persist edge");
                Err(e)
            }
        }
    }

    /// Remove an edge locally, then persist. Returns whether it was shown.
    pub async fn disconnect(&mut self, edge_id: &str) -> FolioResult<bool> {
        let before = self.edges.len();
        self.edges.retain(|e| e.id != edge_id);
        let removed = self.edges.len() != before;

        if let Err(e) = self.sink.remove_edge(edge_id).await {
            warn!(edge = %edge_id, error = %e, "Failed to persist edge removal");
            return Err(e);
        }
        Ok(removed)
    }

    /// Write pending positions now and return the latest save result not yet
    /// reported, or `None` when nothing was written since the last call.
    pub async fn flush(&self) -> Option<FolioResult<BatchOutcome>> {
        self.positions.flush().await;
        self.last_save.lock().ok().and_then(|mut slot| slot.take())
    }
}
