//! Unified error type surfaced by the runtime API.
//!
//! Wraps engine, registry and repository failures so callers can bubble them
//! up with the path or job that caused them.
use std::path::PathBuf;

use sim_core::{BuffError, ErrorSeverity, RegistryError, ScheduleError, SimError};
use thiserror::Error;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Buff(#[from] BuffError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid RON in {path}: {message}")]
    Ron { path: PathBuf, message: String },

    #[error("failed to initialize logging: {0}")]
    Logging(String),

    #[error("sweep worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}

impl RuntimeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Severity of the underlying engine error, if any.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Schedule(e) => e.severity(),
            Self::Registry(e) => e.severity(),
            Self::Buff(e) => e.severity(),
            Self::Ron { .. } => ErrorSeverity::Validation,
            Self::WorkerJoin(_) => ErrorSeverity::Fatal,
            Self::Repository(_) | Self::Io { .. } | Self::Logging(_) => ErrorSeverity::Internal,
        }
    }
}
