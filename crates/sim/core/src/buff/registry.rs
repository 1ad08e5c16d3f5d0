//! Buff registry: validated upserts over a durable backend.

use std::collections::BTreeMap;

use tracing::debug;

use super::{BuffDefinition, DefinitionBackend, MemoryBackend, RegistryError};
use crate::types::BuffId;

/// Owns every registered [`BuffDefinition`].
///
/// Reads are served from an in-memory mirror that is kept in step with the
/// backend on every write. `generation` advances whenever the set of
/// triggers changes, which is what invalidates the event index.
pub struct BuffRegistry {
    backend: Box<dyn DefinitionBackend>,
    definitions: BTreeMap<BuffId, BuffDefinition>,
    generation: u64,
}

impl BuffRegistry {
    /// Registry over a fresh [`MemoryBackend`].
    pub fn in_memory() -> Self {
        Self {
            backend: Box::new(MemoryBackend::new()),
            definitions: BTreeMap::new(),
            generation: 0,
        }
    }

    /// Opens a registry over `backend`, loading everything it already holds.
    pub fn open(backend: Box<dyn DefinitionBackend>) -> Result<Self, RegistryError> {
        let mut definitions = BTreeMap::new();
        for id in backend.ids()? {
            if let Some(definition) = backend.load(&id)? {
                definitions.insert(id, definition);
            }
        }
        debug!(target: "sim::buff", count = definitions.len(), "buff registry opened");
        Ok(Self {
            backend,
            definitions,
            generation: 0,
        })
    }

    /// Idempotent upsert keyed by `definition.id`.
    pub fn register(&mut self, definition: BuffDefinition) -> Result<(), RegistryError> {
        definition.validate()?;
        self.store(definition)
    }

    /// Validates every definition before writing any of them.
    pub fn register_all(
        &mut self,
        definitions: impl IntoIterator<Item = BuffDefinition>,
    ) -> Result<usize, RegistryError> {
        let definitions: Vec<_> = definitions.into_iter().collect();
        for definition in &definitions {
            definition.validate()?;
        }
        let count = definitions.len();
        for definition in definitions {
            self.store(definition)?;
        }
        Ok(count)
    }

    fn store(&mut self, definition: BuffDefinition) -> Result<(), RegistryError> {
        self.backend.upsert(&definition)?;
        let triggers_changed = self
            .definitions
            .get(&definition.id)
            .is_none_or(|previous| previous.triggers != definition.triggers);
        debug!(
            target: "sim::buff",
            buff_id = %definition.id,
            triggers_changed,
            "buff registered"
        );
        self.definitions.insert(definition.id.clone(), definition);
        if triggers_changed {
            self.generation += 1;
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&BuffDefinition, RegistryError> {
        self.definitions
            .get(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// Returns whether a definition was removed.
    pub fn delete(&mut self, id: &str) -> Result<bool, RegistryError> {
        self.backend.remove(id)?;
        let removed = self.definitions.remove(id).is_some();
        if removed {
            self.generation += 1;
            debug!(target: "sim::buff", buff_id = id, "buff deleted");
        }
        Ok(removed)
    }

    pub fn clear(&mut self) -> Result<(), RegistryError> {
        self.backend.clear()?;
        self.definitions.clear();
        self.generation += 1;
        Ok(())
    }

    /// Definitions in ascending id order.
    pub fn definitions(&self) -> impl Iterator<Item = &BuffDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Builds the event type → buff ids index, ids ascending per event.
    pub fn event_index(&self) -> BTreeMap<String, Vec<BuffId>> {
        let mut index: BTreeMap<String, Vec<BuffId>> = BTreeMap::new();
        for definition in self.definitions.values() {
            for trigger in &definition.triggers {
                let ids = index.entry(trigger.event_type.clone()).or_default();
                if ids.last() != Some(&definition.id) {
                    ids.push(definition.id.clone());
                }
            }
        }
        index
    }
}

impl Default for BuffRegistry {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl std::fmt::Debug for BuffRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuffRegistry")
            .field("definitions", &self.definitions.len())
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::buff::{
        Comparator, Condition, ConfigError, Effect, StackingRule, TargetScope, TargetSelector,
        Trigger,
    };

    fn definition(id: &str, event: &str) -> BuffDefinition {
        BuffDefinition::new(id, id.to_uppercase())
            .with_tag("test")
            .with_max_stacks(3)
            .with_duration(10.0)
            .with_stacking(StackingRule::Stack)
            .with_trigger(Trigger::new(event))
            .with_condition(Condition::compare("actor.level", Comparator::Ge, 10))
            .with_effect(Effect::new("add.atk").with_param("value", 120))
            .with_target(TargetSelector::new(TargetScope::Actor))
            .with_metadata("category", json!("unit"))
    }

    #[test]
    fn register_then_get_round_trips() {
        let mut registry = BuffRegistry::in_memory();
        let original = definition("buff.a", "skill.cast");
        registry.register(original.clone()).unwrap();
        assert_eq!(registry.get("buff.a").unwrap(), &original);
    }

    #[test]
    fn get_unknown_is_not_found() {
        let registry = BuffRegistry::in_memory();
        assert_eq!(
            registry.get("nope").unwrap_err(),
            RegistryError::NotFound("nope".into())
        );
    }

    #[test]
    fn register_is_an_idempotent_upsert() {
        let mut registry = BuffRegistry::in_memory();
        registry.register(definition("buff.a", "skill.cast")).unwrap();
        let generation = registry.generation();

        registry.register(definition("buff.a", "skill.cast")).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.generation(), generation);

        registry.register(definition("buff.a", "skill.hit")).unwrap();
        assert!(registry.generation() > generation);
        assert_eq!(registry.event_index().get("skill.hit"), Some(&vec!["buff.a".to_string()]));
        assert!(!registry.event_index().contains_key("skill.cast"));
    }

    #[test]
    fn register_all_is_all_or_nothing() {
        let mut registry = BuffRegistry::in_memory();
        let broken = BuffDefinition::new("buff.broken", "Broken");
        let err = registry
            .register_all([definition("buff.a", "skill.cast"), broken])
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Invalid(ConfigError::MissingTrigger { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn event_index_orders_ids_and_drops_deleted() {
        let mut registry = BuffRegistry::in_memory();
        registry
            .register_all([
                definition("buff.c", "skill.cast"),
                definition("buff.a", "skill.cast"),
                definition("buff.b", "anomaly.activate"),
            ])
            .unwrap();
        assert_eq!(
            registry.event_index()["skill.cast"],
            vec!["buff.a".to_string(), "buff.c".to_string()]
        );

        assert!(registry.delete("buff.a").unwrap());
        assert!(!registry.delete("buff.a").unwrap());
        assert_eq!(registry.event_index()["skill.cast"], vec!["buff.c".to_string()]);
    }

    #[test]
    fn open_loads_existing_backend_records() {
        let mut backend = MemoryBackend::new();
        backend.upsert(&definition("buff.a", "skill.cast")).unwrap();
        let registry = BuffRegistry::open(Box::new(backend)).unwrap();
        assert!(registry.contains("buff.a"));
    }
}
