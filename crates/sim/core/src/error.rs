//! Common error infrastructure for sim-core.
//!
//! Domain-specific errors (`ConfigError`, `BuffError`, `AnomalyError`,
//! `ScheduleError`, ...) live beside the modules that raise them. This module
//! only provides the shared classification used by the driver to decide
//! whether a failure ends the run.
//!
//! # Classification
//!
//! - **Fatal**: an engine invariant was violated (two Active anomalies,
//!   unresolved effect template, event kind without a handler). The run is
//!   aborted and the error reaches the driver unchanged.
//! - **Validation**: a buff definition is malformed. Raised at registration
//!   time; registration is all-or-nothing.
//! - **Recoverable**: an event references an owner or buff that is gone.
//!   Handlers skip such events and the tick continues.
//! - **Internal**: storage backends or collaborators failed in a way the
//!   engine cannot interpret.

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// Missing owner/buff lookups; skipped locally.
    Recoverable,

    /// Malformed definitions rejected at registration.
    Validation,

    /// Backend or collaborator failure.
    Internal,

    /// Engine invariant violated; the run cannot continue.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error must abort the current run.
    pub const fn aborts_run(&self) -> bool {
        !self.is_recoverable()
    }
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common trait for all sim-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity by recoverability, not by impact
pub trait SimError: std::fmt::Display + std::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
