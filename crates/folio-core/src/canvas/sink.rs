//! Where canvas changes are persisted.

use crate::content::Position;
use crate::error::{FolioError, FolioResult};
use crate::graph::{BatchOutcome, Edge, Graph, PositionUpdate};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Backend for canvas writes.
#[async_trait]
pub trait CanvasSink: Send + Sync {
    async fn save_positions(&self, positions: HashMap<String, Position>) -> FolioResult<BatchOutcome>;

    async fn add_edge(&self, source: &str, target: &str) -> FolioResult<Edge>;

    async fn remove_edge(&self, edge_id: &str) -> FolioResult<()>;
}

/// Writes straight through a [`Graph`], off the async runtime.
#[derive(Clone)]
pub struct StoreSink {
    graph: Arc<Graph>,
}

impl StoreSink {
    pub fn new(graph: Arc<Graph>) -> Self {
        Self { graph }
    }

    async fn blocking<T, F>(&self, f: F) -> FolioResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Graph) -> FolioResult<T> + Send + 'static,
    {
        let graph = self.graph.clone();
        tokio::task::spawn_blocking(move || f(&graph))
            .await
            .map_err(|e| FolioError::Task(e.to_string()))?
    }
}

pub(crate) fn position_updates(positions: HashMap<String, Position>) -> BTreeMap<String, PositionUpdate> {
    positions
        .into_iter()
        .map(|(id, position)| (id, PositionUpdate::from(position)))
        .collect()
}

#[async_trait]
impl CanvasSink for StoreSink {
    async fn save_positions(&self, positions: HashMap<String, Position>) -> FolioResult<BatchOutcome> {
        let updates = position_updates(positions);
        self.blocking(move |graph| Ok(graph.move_nodes(&updates))).await
    }

    async fn add_edge(&self, source: &str, target: &str) -> FolioResult<Edge> {
        let (source, target) = (source.to_string(), target.to_string());
        self.blocking(move |graph| graph.connect(&source, &target)).await
    }

    async fn remove_edge(&self, edge_id: &str) -> FolioResult<()> {
        let edge_id = edge_id.to_string();
        self.blocking(move |graph| graph.disconnect(&edge_id)).await
    }
}
