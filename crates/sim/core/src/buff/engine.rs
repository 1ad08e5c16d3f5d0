//! Buff engine facade.

use serde::{Deserialize, Serialize};
use serde_json::Map;
use tracing::{debug, trace};

use super::{
    BuffContext, BuffDefinition, BuffError, BuffRegistry, BuffStore, ConditionEvaluator,
    EffectError, EffectExecutor, EffectOutcome, EventRouter, MODIFIERS_KEY,
};
use crate::types::BuffId;

/// One matched buff and the outcomes of its effects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DispatchMatch {
    pub buff_id: BuffId,
    pub outcomes: Vec<EffectOutcome>,
}

/// Wires registry, router, evaluator, executor and instance store.
#[derive(Debug)]
pub struct BuffEngine {
    registry: BuffRegistry,
    router: EventRouter,
    evaluator: ConditionEvaluator,
    executor: EffectExecutor,
    store: BuffStore,
}

impl BuffEngine {
    pub fn new(registry: BuffRegistry) -> Self {
        Self::with_executor(registry, EffectExecutor::with_builtin())
    }

    pub fn with_executor(registry: BuffRegistry, executor: EffectExecutor) -> Self {
        Self {
            registry,
            router: EventRouter::new(),
            evaluator: ConditionEvaluator::new(),
            executor,
            store: BuffStore::new(),
        }
    }

    pub fn register_definition(&mut self, definition: BuffDefinition) -> Result<(), BuffError> {
        self.registry.register(definition)?;
        Ok(())
    }

    pub fn registry(&self) -> &BuffRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut BuffRegistry {
        &mut self.registry
    }

    pub fn store(&self) -> &BuffStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut BuffStore {
        &mut self.store
    }

    pub fn executor_mut(&mut self) -> &mut EffectExecutor {
        &mut self.executor
    }

    /// Routes `event_type` to its candidate buffs and runs every full match.
    ///
    /// Expired instances are purged first so expiry wins over activation in
    /// the same tick. Candidates are visited in router order; a buff whose
    /// conditions fail has no side effects. Effects never dispatch again.
    pub fn dispatch(
        &mut self,
        event_type: &str,
        context: &BuffContext,
    ) -> Result<Vec<DispatchMatch>, BuffError> {
        self.store.purge_expired();

        let mapping = context.mapping();
        let mut matches = Vec::new();
        for buff_id in self.router.candidates(&self.registry, event_type) {
            let definition = self.registry.get(buff_id)?;
            if !self.evaluator.matches(definition, &mapping) {
                trace!(target: "sim::buff", buff_id = %buff_id, event_type, "conditions not met");
                continue;
            }

            let outcomes = self
                .executor
                .execute(definition, context, &mut self.store)
                .map_err(|source: EffectError| BuffError::Effect {
                    buff_id: buff_id.clone(),
                    source,
                })?;
            trace!(target: "sim::buff", buff_id = %buff_id, event_type, "buff executed");
            matches.push(DispatchMatch {
                buff_id: buff_id.clone(),
                outcomes,
            });
        }

        if !matches.is_empty() {
            debug!(
                target: "sim::buff",
                event_type,
                tick = context.tick.0,
                matched = matches.len(),
                "buff dispatch"
            );
        }
        Ok(matches)
    }

    /// Applies a definition directly, bypassing triggers and conditions.
    ///
    /// A `modifiers` entry in the definition's metadata is carried onto the
    /// instance.
    pub fn apply(&mut self, buff_id: &str, owner: &str) -> Result<u32, BuffError> {
        let definition = self.registry.get(buff_id)?;
        let mut metadata = Map::new();
        if let Some(modifiers) = definition.metadata.get(MODIFIERS_KEY) {
            metadata.insert(MODIFIERS_KEY.to_string(), modifiers.clone());
        }
        Ok(self.store.apply(definition, owner, metadata))
    }

    /// Decays every instance by `delta` and purges the expired ones.
    pub fn advance(&mut self, delta: f64) -> usize {
        self.store.tick_all(delta);
        self.store.purge_expired()
    }
}

impl Default for BuffEngine {
    fn default() -> Self {
        Self::new(BuffRegistry::in_memory())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::buff::{BuffInstance, Comparator, Condition, Effect, Trigger};
    use crate::types::Tick;

    fn scenario_definition() -> BuffDefinition {
        BuffDefinition::new("b1", "Combo Focus")
            .with_trigger(Trigger::new("skill.cast"))
            .with_condition(Condition::or([
                Condition::compare("actor.level", Comparator::Ge, 10),
                Condition::compare("event.payload.combo", Comparator::Ge, 3),
            ]))
            .with_effect(Effect::new("add.atk").with_param("value", 120))
    }

    fn engine() -> BuffEngine {
        let mut executor = EffectExecutor::with_builtin();
        executor.register_handler("add.atk", |effect, _, _, _| {
            Ok(EffectOutcome::Value {
                value: effect.parameters["value"].clone(),
            })
        });
        BuffEngine::with_executor(BuffRegistry::in_memory(), executor)
    }

    fn cast(level: u32, combo: u32) -> BuffContext {
        BuffContext::new(Tick(1), json!({ "type": "skill.cast", "payload": { "combo": combo } }))
            .with_actor("hero", json!({ "name": "Hero", "level": level }))
    }

    #[test]
    fn or_condition_decides_execution() {
        let mut engine = engine();
        engine.register_definition(scenario_definition()).unwrap();

        let matched = engine.dispatch("skill.cast", &cast(5, 4)).unwrap();
        assert_eq!(
            matched,
            vec![DispatchMatch {
                buff_id: "b1".into(),
                outcomes: vec![EffectOutcome::Value { value: json!(120) }],
            }]
        );

        assert!(engine.dispatch("skill.cast", &cast(5, 1)).unwrap().is_empty());
        assert!(engine.dispatch("skill.hit", &cast(20, 9)).unwrap().is_empty());
    }

    #[test]
    fn empty_condition_list_always_executes() {
        let mut engine = engine();
        engine
            .register_definition(
                BuffDefinition::new("b.vacuous", "Always")
                    .with_trigger(Trigger::new("skill.cast"))
                    .with_effect(Effect::new("add.atk").with_param("value", 1)),
            )
            .unwrap();
        for (level, combo) in [(0, 0), (99, 99)] {
            assert_eq!(engine.dispatch("skill.cast", &cast(level, combo)).unwrap().len(), 1);
        }
    }

    #[test]
    fn router_follows_reregistration() {
        let mut engine = engine();
        engine.register_definition(scenario_definition()).unwrap();
        assert_eq!(engine.dispatch("skill.cast", &cast(10, 0)).unwrap().len(), 1);

        let moved = BuffDefinition {
            triggers: vec![Trigger::new("skill.hit")],
            ..scenario_definition()
        };
        engine.register_definition(moved).unwrap();
        assert!(engine.dispatch("skill.cast", &cast(10, 0)).unwrap().is_empty());
        assert_eq!(engine.dispatch("skill.hit", &cast(10, 0)).unwrap().len(), 1);
    }

    #[test]
    fn condition_reads_root_level_extras() {
        let mut engine = engine();
        engine
            .register_definition(
                BuffDefinition::new("b.combo", "Combo")
                    .with_trigger(Trigger::new("skill.cast"))
                    .with_condition(Condition::compare("combo", Comparator::Ge, 3))
                    .with_effect(Effect::new("add.atk").with_param("value", 1)),
            )
            .unwrap();

        let matched = engine
            .dispatch("skill.cast", &cast(1, 0).with_extra("combo", 4))
            .unwrap();
        assert_eq!(matched.len(), 1);
        assert!(engine
            .dispatch("skill.cast", &cast(1, 0).with_extra("combo", 2))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn unknown_template_fails_dispatch() {
        let mut engine = BuffEngine::default();
        engine.register_definition(scenario_definition()).unwrap();
        let err = engine.dispatch("skill.cast", &cast(10, 0)).unwrap_err();
        assert!(matches!(
            err,
            BuffError::Effect { ref buff_id, source: EffectError::UnknownTemplate(_) } if buff_id == "b1"
        ));
    }

    #[test]
    fn expired_instances_are_purged_before_dispatch() {
        let mut engine = engine();
        engine
            .store_mut()
            .add(BuffInstance::new("b1", "hero").with_duration(0.0));
        engine.dispatch("nothing.routes", &cast(1, 1)).unwrap();
        assert!(engine.store().is_empty());
    }

    #[test]
    fn apply_buff_effect_creates_instances_through_dispatch() {
        let mut engine = BuffEngine::default();
        engine
            .register_definition(
                BuffDefinition::new("buff.rally", "Rally")
                    .with_duration(3.0)
                    .with_trigger(Trigger::new("skill.cast"))
                    .with_effect(Effect::new("apply_buff")),
            )
            .unwrap();
        engine.dispatch("skill.cast", &cast(1, 1)).unwrap();
        assert_eq!(engine.store().stacks_of("hero", "buff.rally"), 1);

        assert_eq!(engine.advance(3.0), 1);
        assert!(engine.store().is_empty());
    }
}
