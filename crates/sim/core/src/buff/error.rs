//! Errors raised by the buff rule engine.

use thiserror::Error;

use crate::error::{ErrorSeverity, SimError};
use crate::types::BuffId;

/// A buff definition failed validation at registration time.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("buff definition has an empty id")]
    EmptyId,

    #[error("buff `{buff_id}` declares no triggers")]
    MissingTrigger { buff_id: BuffId },

    #[error("buff `{buff_id}` has a trigger with an empty event type")]
    EmptyTrigger { buff_id: BuffId },

    #[error("buff `{buff_id}` must allow at least one stack")]
    InvalidMaxStacks { buff_id: BuffId },

    #[error("buff `{buff_id}` has invalid duration {duration}")]
    InvalidDuration { buff_id: BuffId, duration: f64 },

    #[error("buff `{buff_id}` has an invalid condition: {reason}")]
    InvalidCondition { buff_id: BuffId, reason: String },

    #[error("buff `{buff_id}` has an invalid `{template_id}` effect: {reason}")]
    InvalidEffect {
        buff_id: BuffId,
        template_id: String,
        reason: String,
    },
}

impl SimError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyId => "CONFIG_EMPTY_ID",
            Self::MissingTrigger { .. } => "CONFIG_MISSING_TRIGGER",
            Self::EmptyTrigger { .. } => "CONFIG_EMPTY_TRIGGER",
            Self::InvalidMaxStacks { .. } => "CONFIG_INVALID_MAX_STACKS",
            Self::InvalidDuration { .. } => "CONFIG_INVALID_DURATION",
            Self::InvalidCondition { .. } => "CONFIG_INVALID_CONDITION",
            Self::InvalidEffect { .. } => "CONFIG_INVALID_EFFECT",
        }
    }
}

/// Failure reported by a [`DefinitionBackend`](super::DefinitionBackend).
#[derive(Clone, Debug, PartialEq, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(String),

    #[error("stored definition `{id}` is corrupted: {message}")]
    Corrupted { id: BuffId, message: String },

    #[error("storage backend failed: {0}")]
    Backend(String),
}

impl SimError for StorageError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "STORAGE_IO",
            Self::Corrupted { .. } => "STORAGE_CORRUPTED",
            Self::Backend(_) => "STORAGE_BACKEND",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum RegistryError {
    #[error("buff `{0}` is not registered")]
    NotFound(BuffId),

    #[error(transparent)]
    Invalid(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SimError for RegistryError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotFound(_) => ErrorSeverity::Recoverable,
            Self::Invalid(e) => e.severity(),
            Self::Storage(e) => e.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "REGISTRY_NOT_FOUND",
            Self::Invalid(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum EffectError {
    #[error("no handler registered for effect template `{0}`")]
    UnknownTemplate(String),

    #[error("invalid parameters for `{template_id}`: {message}")]
    InvalidParams {
        template_id: String,
        message: String,
    },

    #[error("effect `{template_id}` failed: {message}")]
    Failed {
        template_id: String,
        message: String,
    },
}

impl SimError for EffectError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownTemplate(_) => ErrorSeverity::Fatal,
            Self::InvalidParams { .. } => ErrorSeverity::Validation,
            Self::Failed { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownTemplate(_) => "EFFECT_UNKNOWN_TEMPLATE",
            Self::InvalidParams { .. } => "EFFECT_INVALID_PARAMS",
            Self::Failed { .. } => "EFFECT_FAILED",
        }
    }
}

/// Errors surfaced by [`BuffEngine`](super::BuffEngine).
#[derive(Clone, Debug, PartialEq, Error)]
pub enum BuffError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("buff `{buff_id}`: {source}")]
    Effect {
        buff_id: BuffId,
        #[source]
        source: EffectError,
    },
}

impl BuffError {
    /// True when the error only reflects a buff that is no longer registered.
    pub fn is_lookup_miss(&self) -> bool {
        matches!(self, Self::Registry(RegistryError::NotFound(_)))
    }
}

impl SimError for BuffError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Registry(e) => e.severity(),
            Self::Effect { source, .. } => source.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Registry(e) => e.error_code(),
            Self::Effect { source, .. } => source.error_code(),
        }
    }
}
