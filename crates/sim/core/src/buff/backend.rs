//! Durable storage behind the buff registry.

use std::collections::BTreeMap;

use super::{BuffDefinition, StorageError};
use crate::types::BuffId;

/// Key-value persistence of definitions, one record per buff id.
///
/// Triggers and effects are stored as ordered sub-records of their
/// definition; the exact layout is up to the implementation.
pub trait DefinitionBackend: Send {
    /// Inserts or replaces the record of `definition.id`.
    fn upsert(&mut self, definition: &BuffDefinition) -> Result<(), StorageError>;

    fn load(&self, id: &str) -> Result<Option<BuffDefinition>, StorageError>;

    /// Returns whether a record was removed.
    fn remove(&mut self, id: &str) -> Result<bool, StorageError>;

    /// All stored ids in ascending order.
    fn ids(&self) -> Result<Vec<BuffId>, StorageError>;

    fn clear(&mut self) -> Result<(), StorageError>;
}

/// Volatile backend used by tests and throwaway runs.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    records: BTreeMap<BuffId, BuffDefinition>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DefinitionBackend for MemoryBackend {
    fn upsert(&mut self, definition: &BuffDefinition) -> Result<(), StorageError> {
        self.records.insert(definition.id.clone(), definition.clone());
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Option<BuffDefinition>, StorageError> {
        Ok(self.records.get(id).cloned())
    }

    fn remove(&mut self, id: &str) -> Result<bool, StorageError> {
        Ok(self.records.remove(id).is_some())
    }

    fn ids(&self) -> Result<Vec<BuffId>, StorageError> {
        Ok(self.records.keys().cloned().collect())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.records.clear();
        Ok(())
    }
}
