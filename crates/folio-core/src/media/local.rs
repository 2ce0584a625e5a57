use super::{ImageStore, MediaError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// URL prefix the web server mounts the uploads directory on.
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Images written to a directory served under `/uploads`.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn put(&self, key: &str, _content_type: &str, bytes: Vec<u8>) -> Result<String, MediaError> {
        if key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(MediaError::Rejected(format!("invalid object key: {}", key)));
        }
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(key), bytes).await?;
        Ok(format!("{}/{}", UPLOADS_ROUTE, key))
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}
