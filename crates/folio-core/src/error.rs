//! Centralized error types for Folio.

use folio_db::DbError;
use thiserror::Error;

/// Main error type for Folio operations.
#[derive(Error, Debug)]
pub enum FolioError {
    #[error("Content not found: {0}")]
    ContentNotFound(String),

    #[error("Edge not found: {0}")]
    EdgeNotFound(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Task file not found: {0}")]
    TaskFileNotFound(String),

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Media error: {0}")]
    Media(#[from] crate::media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Remote request failed: {0}")]
    Remote(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

/// Result type for Folio operations.
pub type FolioResult<T> = Result<T, FolioError>;

impl FolioError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Whether this error means the addressed entity does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ContentNotFound(_)
                | Self::EdgeNotFound(_)
                | Self::ProjectNotFound(_)
                | Self::TaskFileNotFound(_)
                | Self::Database(DbError::NotFound(_))
        )
    }

    /// Whether the caller sent something unusable.
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::Database(DbError::InvalidFileName(_))
                | Self::Media(crate::media::MediaError::Rejected(_))
        )
    }

    /// Whether the request collided with existing state.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::Database(DbError::Conflict(_)))
    }
}
