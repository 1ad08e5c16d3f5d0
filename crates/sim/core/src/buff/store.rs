//! Live buff instances, keyed by owner.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

use super::{BuffDefinition, StackingRule};
use crate::types::{BuffId, OwnerId};

/// Metadata key under which `apply_buff` records stat modifiers.
pub const MODIFIERS_KEY: &str = "modifiers";

/// Runtime state of one applied buff.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuffInstance {
    pub buff_id: BuffId,
    pub owner_id: OwnerId,
    pub stacks: u32,
    /// `None` never expires; otherwise non-increasing with floor 0.
    pub remaining_duration: Option<f64>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl BuffInstance {
    pub fn new(buff_id: impl Into<BuffId>, owner_id: impl Into<OwnerId>) -> Self {
        Self {
            buff_id: buff_id.into(),
            owner_id: owner_id.into(),
            stacks: 1,
            remaining_duration: None,
            metadata: Map::new(),
        }
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.remaining_duration = Some(duration.max(0.0));
        self
    }

    pub fn tick(&mut self, delta: f64) {
        if let Some(remaining) = self.remaining_duration.as_mut() {
            *remaining = (*remaining - delta).max(0.0);
        }
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_duration.is_some_and(|remaining| remaining <= 0.0)
    }
}

/// Owned per simulation; never shared between runs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuffStore {
    instances: BTreeMap<OwnerId, Vec<BuffInstance>>,
}

impl BuffStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, instance: BuffInstance) {
        self.instances
            .entry(instance.owner_id.clone())
            .or_default()
            .push(instance);
    }

    /// Applies `definition` to `owner` following its stacking rule.
    ///
    /// Returns the stack count of the touched instance, or for independent
    /// buffs the number of live records of that buff on the owner.
    pub fn apply(
        &mut self,
        definition: &BuffDefinition,
        owner: &str,
        metadata: Map<String, Value>,
    ) -> u32 {
        let instances = self.instances.entry(owner.to_string()).or_default();
        let position = instances
            .iter()
            .position(|instance| instance.buff_id == definition.id);

        let stacks = match (definition.stacking_rule, position) {
            (StackingRule::Refresh, Some(index)) => {
                let instance = &mut instances[index];
                instance.stacks = 1;
                instance.remaining_duration = definition.duration;
                instance.metadata.extend(metadata);
                1
            }
            (StackingRule::Stack, Some(index)) => {
                let instance = &mut instances[index];
                instance.stacks = (instance.stacks + 1).min(definition.max_stacks);
                instance.remaining_duration = definition.duration;
                instance.metadata.extend(metadata);
                instance.stacks
            }
            (rule, _) => {
                instances.push(BuffInstance {
                    buff_id: definition.id.clone(),
                    owner_id: owner.to_string(),
                    stacks: 1,
                    remaining_duration: definition.duration,
                    metadata,
                });
                if rule == StackingRule::Independent {
                    instances
                        .iter()
                        .filter(|instance| instance.buff_id == definition.id)
                        .count() as u32
                } else {
                    1
                }
            }
        };

        trace!(
            target: "sim::buff",
            buff_id = %definition.id,
            owner,
            stacks,
            rule = %definition.stacking_rule,
            "buff applied"
        );
        stacks
    }

    /// Removes every instance of `owner_id` matching `predicate`.
    pub fn remove<F>(&mut self, owner_id: &str, mut predicate: F) -> usize
    where
        F: FnMut(&BuffInstance) -> bool,
    {
        let Some(instances) = self.instances.get_mut(owner_id) else {
            return 0;
        };
        let before = instances.len();
        instances.retain(|instance| !predicate(instance));
        let removed = before - instances.len();
        if instances.is_empty() {
            self.instances.remove(owner_id);
        }
        removed
    }

    pub fn get(&self, owner_id: &str) -> &[BuffInstance] {
        self.instances
            .get(owner_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn find<'a>(
        &'a self,
        owner_id: &str,
        buff_id: &'a str,
    ) -> impl Iterator<Item = &'a BuffInstance> + 'a {
        self.get(owner_id)
            .iter()
            .filter(move |instance| instance.buff_id == buff_id)
    }

    /// Total stacks of `buff_id` on `owner_id` across all its records.
    pub fn stacks_of(&self, owner_id: &str, buff_id: &str) -> u32 {
        self.find(owner_id, buff_id).map(|instance| instance.stacks).sum()
    }

    pub fn tick_all(&mut self, delta: f64) {
        self.instances
            .values_mut()
            .flatten()
            .for_each(|instance| instance.tick(delta));
    }

    /// Removes and counts every instance whose duration reached zero.
    pub fn purge_expired(&mut self) -> usize {
        let mut removed = 0;
        self.instances.retain(|_, instances| {
            let before = instances.len();
            instances.retain(|instance| !instance.is_expired());
            removed += before - instances.len();
            !instances.is_empty()
        });
        if removed > 0 {
            trace!(target: "sim::buff", removed, "expired buffs purged");
        }
        removed
    }

    /// Sums numeric `modifiers` metadata of `owner_id`'s buffs, scaled by stacks.
    pub fn modifier_totals(&self, owner_id: &str) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        for instance in self.get(owner_id) {
            let Some(Value::Object(modifiers)) = instance.metadata.get(MODIFIERS_KEY) else {
                continue;
            };
            for (name, value) in modifiers {
                if let Some(value) = value.as_f64() {
                    *totals.entry(name.clone()).or_insert(0.0) += value * f64::from(instance.stacks);
                }
            }
        }
        totals
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuffInstance> {
        self.instances.values().flatten()
    }

    pub fn owners(&self) -> impl Iterator<Item = &OwnerId> {
        self.instances.keys()
    }

    pub fn len(&self) -> usize {
        self.instances.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }
}
