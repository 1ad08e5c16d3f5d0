//! Error types raised by repository implementations.

use sim_core::StorageError;
use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("corrupted data in {path}: {message}")]
    CorruptedData { path: String, message: String },

    #[error("invalid buff id for file storage: {0:?}")]
    InvalidId(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

impl From<RepositoryError> for StorageError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Io(e) => StorageError::Io(e.to_string()),
            RepositoryError::CorruptedData { path, message } => StorageError::Corrupted {
                id: path,
                message,
            },
            other => StorageError::Backend(other.to_string()),
        }
    }
}
