//! Application state.

use crate::config::{ServerConfig, StoreBackend};
use folio_core::auth::Credentials;
use folio_core::graph::{Graph, GraphStore};
use folio_core::media::{ImageStore, LocalImageStore, S3ImageStore};
use folio_db::{DbPool, FlatFileStore, TaskDir};
use std::path::PathBuf;
use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub graph: Arc<Graph>,
    pub db: Arc<DbPool>,
    pub images: Arc<dyn ImageStore>,
    pub credentials: Credentials,
    /// Directory served under `/uploads` when images are stored locally.
    pub uploads: Option<PathBuf>,
}

impl AppState {
    pub fn new(
        graph: Arc<Graph>,
        db: Arc<DbPool>,
        images: Arc<dyn ImageStore>,
        credentials: Credentials,
        uploads: Option<PathBuf>,
    ) -> Self {
        Self {
            graph,
            db,
            images,
            credentials,
            uploads,
        }
    }

    /// Open every store named by `config`.
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let db = Arc::new(folio_db::init_pool(&config.db_path)?);
        let tasks = TaskDir::open(&config.task_dir)?;

        let store: Arc<dyn GraphStore> = match config.backend {
            StoreBackend::Sqlite => db.clone(),
            StoreBackend::Files => Arc::new(FlatFileStore::open(&config.data_dir)?),
        };
        let graph = Arc::new(Graph::new(store, tasks));

        let (images, uploads) = match &config.s3 {
            Some(s3) => {
                let store: Arc<dyn ImageStore> = Arc::new(S3ImageStore::new(s3.clone())?);
                (store, None)
            }
            None => {
                std::fs::create_dir_all(&config.upload_dir)?;
                let store: Arc<dyn ImageStore> = Arc::new(LocalImageStore::new(&config.upload_dir));
                (store, Some(config.upload_dir.clone()))
            }
        };

        if config.password.as_deref().map_or(true, str::is_empty) {
            tracing::warn!("No API password configured; protected operations will be refused");
        }

        tracing::info!(
            backend = graph.store().backend(),
            images = images.backend(),
            db = %config.db_path.display(),
            "Opened stores"
        );

        Ok(Self::new(
            graph,
            db,
            images,
            Credentials::new(config.password.as_deref()),
            uploads,
        ))
    }
}
