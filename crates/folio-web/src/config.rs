//! Server configuration, resolved by the binary from flags and environment.

use folio_core::files::watcher::WatcherConfig;
use folio_core::media::S3Config;
use std::path::PathBuf;

/// Where content nodes and edges are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Sqlite,
    /// `content.json` / `edges.json` in the data directory.
    Files,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub backend: StoreBackend,
    /// SQLite database; always used for projects and the layout.
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
    pub task_dir: PathBuf,
    pub upload_dir: PathBuf,
    /// Secret for protected operations. `None` refuses them all.
    pub password: Option<String>,
    /// Upload images to S3 instead of `upload_dir`.
    pub s3: Option<S3Config>,
    /// Task-directory watcher; `None` disables it.
    pub watcher: Option<WatcherConfig>,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
