//! Durable storage for buff definitions.
//!
//! The engine only sees the [`DefinitionBackend`](sim_core::DefinitionBackend)
//! contract; this module provides the file-backed implementation used by
//! long-lived definition stores.

mod error;
mod file;

pub use error::RepositoryError;
pub use file::FileDefinitionBackend;
