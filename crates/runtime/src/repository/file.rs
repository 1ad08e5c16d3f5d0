//! File-based definition backend.

use std::fs;
use std::path::{Path, PathBuf};

use sim_core::{BuffDefinition, BuffId, DefinitionBackend, StorageError};

use super::error::{RepositoryError, Result};

const EXTENSION: &str = "json";

/// Stores each buff definition as `{id}.json` under one directory.
///
/// Triggers and effects keep their declared order as JSON arrays. Writes go
/// to a temporary file first and are renamed into place, so a crash never
/// leaves a half-written record behind.
#[derive(Debug)]
pub struct FileDefinitionBackend {
    base_dir: PathBuf,
}

impl FileDefinitionBackend {
    /// Opens (and creates if needed) a definition directory.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn record_path(&self, id: &str) -> Result<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            && !id.starts_with('.');
        if !valid {
            return Err(RepositoryError::InvalidId(id.to_string()));
        }
        Ok(self.base_dir.join(format!("{id}.{EXTENSION}")))
    }

    fn write(&self, definition: &BuffDefinition) -> Result<()> {
        let path = self.record_path(&definition.id)?;
        let temp_path = path.with_extension("json.tmp");

        let bytes = serde_json::to_vec_pretty(definition)
            .map_err(|e| RepositoryError::Json(e.to_string()))?;
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!(
            target: "runtime::repository",
            buff_id = %definition.id,
            path = %path.display(),
            "saved definition"
        );
        Ok(())
    }

    fn read(&self, id: &str) -> Result<Option<BuffDefinition>> {
        let path = self.record_path(id)?;
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        let definition: BuffDefinition =
            serde_json::from_slice(&bytes).map_err(|e| RepositoryError::CorruptedData {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        if definition.id != id {
            return Err(RepositoryError::CorruptedData {
                path: path.display().to_string(),
                message: format!("record holds id {:?}", definition.id),
            });
        }
        Ok(Some(definition))
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let path = self.record_path(id)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        tracing::debug!(target: "runtime::repository", buff_id = id, "deleted definition");
        Ok(true)
    }

    fn list(&self) -> Result<Vec<BuffId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(id) = filename.strip_suffix(".json")
            {
                ids.push(id.to_string());
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }
}

impl DefinitionBackend for FileDefinitionBackend {
    fn upsert(&mut self, definition: &BuffDefinition) -> std::result::Result<(), StorageError> {
        Ok(self.write(definition)?)
    }

    fn load(&self, id: &str) -> std::result::Result<Option<BuffDefinition>, StorageError> {
        Ok(self.read(id)?)
    }

    fn remove(&mut self, id: &str) -> std::result::Result<bool, StorageError> {
        Ok(self.delete(id)?)
    }

    fn ids(&self) -> std::result::Result<Vec<BuffId>, StorageError> {
        Ok(self.list()?)
    }

    fn clear(&mut self) -> std::result::Result<(), StorageError> {
        for id in self.list()? {
            self.delete(&id)?;
        }
        Ok(())
    }
}
