use thiserror::Error;

use crate::anomaly::AnomalyError;
use crate::buff::BuffError;
use crate::error::{ErrorSeverity, SimError};
use crate::event::EventKind;
use crate::types::Tick;

/// Failure inside a single handler invocation.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Anomaly(#[from] AnomalyError),

    #[error(transparent)]
    Buff(#[from] BuffError),

    #[error("handler for {expected} received a {found} event")]
    UnexpectedEvent { expected: EventKind, found: EventKind },

    #[error("failed to encode event for buff dispatch: {0}")]
    Encode(String),
}

impl SimError for HandlerError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Anomaly(e) => e.severity(),
            Self::Buff(e) => e.severity(),
            Self::UnexpectedEvent { .. } => ErrorSeverity::Fatal,
            Self::Encode(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Anomaly(e) => e.error_code(),
            Self::Buff(e) => e.error_code(),
            Self::UnexpectedEvent { .. } => "HANDLER_UNEXPECTED_EVENT",
            Self::Encode(_) => "HANDLER_ENCODE",
        }
    }
}

/// Errors raised while registering handlers or settling a tick.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ScheduleError {
    #[error("a handler for {0} is already registered")]
    DuplicateHandler(EventKind),

    #[error("no handler registered for {0} events")]
    UnhandledEvent(EventKind),

    #[error("{kind} handler failed at {tick}: {source}")]
    HandlerFailed {
        kind: EventKind,
        tick: Tick,
        #[source]
        source: HandlerError,
    },

    #[error("settling {tick} did not converge after {passes} passes ({pending} events still due)")]
    CascadeTooDeep {
        tick: Tick,
        passes: usize,
        pending: usize,
    },
}

impl ScheduleError {
    /// Kind of the event that caused the failure, when one is known.
    pub fn event_kind(&self) -> Option<EventKind> {
        match self {
            Self::DuplicateHandler(kind)
            | Self::UnhandledEvent(kind)
            | Self::HandlerFailed { kind, .. } => Some(*kind),
            Self::CascadeTooDeep { .. } => None,
        }
    }
}

impl SimError for ScheduleError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::DuplicateHandler(_) => ErrorSeverity::Validation,
            Self::HandlerFailed { source, .. } => source.severity(),
            Self::UnhandledEvent(_) | Self::CascadeTooDeep { .. } => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateHandler(_) => "SCHEDULE_DUPLICATE_HANDLER",
            Self::UnhandledEvent(_) => "SCHEDULE_UNHANDLED_EVENT",
            Self::HandlerFailed { source, .. } => source.error_code(),
            Self::CascadeTooDeep { .. } => "SCHEDULE_CASCADE_TOO_DEEP",
        }
    }
}
