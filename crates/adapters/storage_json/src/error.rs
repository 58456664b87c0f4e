//! Storage-specific error type wrapping file and JSON errors.

use scenehub_domain::error::SceneHubError;

/// Errors originating from the JSON file store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading, writing, or renaming a file failed.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// Failed to serialize a document.
    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),
}

impl From<StorageError> for SceneHubError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
