//! Image storage: local uploads directory or an S3-compatible bucket.

mod local;
mod s3;

pub use local::{LocalImageStore, UPLOADS_ROUTE};
pub use s3::{S3Config, S3ImageStore};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Content type used when the client sends none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upload rejected: {0}")]
    Rejected(String),

    #[error("Storage misconfigured: {0}")]
    Config(String),

    #[error("Object store returned {status}: {body}")]
    Upstream { status: u16, body: String },
}

/// Somewhere uploaded images can be written and later fetched by URL.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `bytes` under `key` and return the public URL.
    async fn put(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Result<String, MediaError>;

    fn backend(&self) -> &'static str;
}

/// A stored image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadedImage {
    pub key: String,
    pub url: String,
}

/// Object key `<millis>-<file name>`, with the file name reduced to
/// characters that are safe in both a path and a URL.
pub fn object_key(file_name: &str, millis: i64) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let mut cleaned = String::with_capacity(base.len());
    for c in base.trim().chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
            cleaned.push(c);
        } else if c.is_whitespace() {
            cleaned.push('-');
        }
    }
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        format!("{}-image", millis)
    } else {
        format!("{}-{}", millis, cleaned)
    }
}

/// Validate and store an uploaded image.
pub async fn upload_image(
    store: &dyn ImageStore,
    file_name: &str,
    content_type: Option<&str>,
    bytes: Vec<u8>,
) -> Result<UploadedImage, MediaError> {
    if bytes.is_empty() {
        return Err(MediaError::Rejected("empty file".to_string()));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(MediaError::Rejected(format!(
            "file is {} bytes, limit is {}",
            bytes.len(),
            MAX_UPLOAD_BYTES
        )));
    }

    let content_type = content_type
        .filter(|ct| !ct.trim().is_empty())
        .unwrap_or(DEFAULT_CONTENT_TYPE);
    let key = object_key(file_name, chrono::Utc::now().timestamp_millis());
    let size = bytes.len();
    let url = store.put(&key, content_type, bytes).await?;

    tracing::info!(backend = store.backend(), key = %key, size, "Stored image");
    Ok(UploadedImage { key, url })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_object_key() {
        assert_eq!(object_key("photo.png", 17), "17-photo.png");
        assert_eq!(object_key("my cat (1).jpg", 5), "5-my-cat-1.jpg");
        assert_eq!(object_key("../../etc/passwd", 1), "1-passwd");
        assert_eq!(object_key("..", 2), "2-image");
        assert_eq!(object_key("", 3), "3-image");
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_and_oversized() {
        let dir = TempDir::new().unwrap();
        let store = LocalImageStore::new(dir.path());

        let err = upload_image(&store, "a.png", None, Vec::new()).await.unwrap_err();
        assert!(matches!(err, MediaError::Rejected(_)));

        let err = upload_image(&store, "a.png", None, vec![0; MAX_UPLOAD_BYTES + 1])
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Rejected(_)));
    }

    #[tokio::test]
    async fn test_upload_to_local_store() {
        let dir = TempDir::new().unwrap();
        let store = LocalImageStore::new(dir.path());

        let image = upload_image(&store, "shot.png", Some("image/png"), b"png".to_vec())
            .await
            .unwrap();
        assert!(image.key.ends_with("-shot.png"));
        assert_eq!(image.url, format!("/uploads/{}", image.key));
        assert_eq!(std::fs::read(dir.path().join(&image.key)).unwrap(), b"png");
    }
}
