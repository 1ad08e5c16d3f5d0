//! Effect templates and the executor that runs them.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

use super::store::MODIFIERS_KEY;
use super::{BuffContext, BuffDefinition, BuffStore, Effect, EffectError};
use crate::types::{BuffId, OwnerId};

/// Applies the dispatching buff to its targets.
pub const APPLY_BUFF: &str = "apply_buff";
/// Removes instances of a buff from an owner.
pub const REMOVE_BUFF: &str = "remove_buff";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplyBuffParams {
    /// Explicit owner; when absent the definition's target selector decides.
    #[serde(default)]
    pub owner: Option<OwnerId>,
    /// Stat modifiers recorded on the instance, summed per stack.
    #[serde(default)]
    pub modifiers: BTreeMap<String, f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoveBuffParams {
    /// Defaults to the dispatch actor.
    #[serde(default)]
    pub owner: Option<OwnerId>,
    /// Defaults to the dispatching buff.
    #[serde(default)]
    pub buff_id: Option<BuffId>,
}

/// Schema-checked view of an effect's parameter bag.
#[derive(Clone, Debug, PartialEq)]
pub enum EffectParams {
    ApplyBuff(ApplyBuffParams),
    RemoveBuff(RemoveBuffParams),
    /// Templates without a typed schema keep the raw bag.
    Generic(Map<String, Value>),
}

impl EffectParams {
    pub fn parse(effect: &Effect) -> Result<Self, EffectError> {
        let typed = |message: serde_json::Error| EffectError::InvalidParams {
            template_id: effect.template_id.clone(),
            message: message.to_string(),
        };
        let raw = || Value::Object(effect.parameters.clone());

        match effect.template_id.as_str() {
            APPLY_BUFF => serde_json::from_value(raw())
                .map(Self::ApplyBuff)
                .map_err(typed),
            REMOVE_BUFF => serde_json::from_value(raw())
                .map(Self::RemoveBuff)
                .map_err(typed),
            _ => Ok(Self::Generic(effect.parameters.clone())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppliedBuff {
    pub owner: OwnerId,
    pub stacks: u32,
}

/// Result of running one effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EffectOutcome {
    Applied { targets: Vec<AppliedBuff> },
    Removed { owner: OwnerId, count: usize },
    Value { value: Value },
}

/// Signature of an effect template handler.
pub type EffectHandler = Box<
    dyn Fn(&Effect, &BuffDefinition, &BuffContext, &mut BuffStore) -> Result<EffectOutcome, EffectError>
        + Send
        + Sync,
>;

/// Resolves template ids to handlers and runs a definition's effects in order.
pub struct EffectExecutor {
    handlers: HashMap<String, EffectHandler>,
}

impl EffectExecutor {
    /// Executor with no templates at all.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Executor with `apply_buff` and `remove_buff` registered.
    pub fn with_builtin() -> Self {
        let mut executor = Self::empty();
        executor.register_handler(APPLY_BUFF, apply_buff);
        executor.register_handler(REMOVE_BUFF, remove_buff);
        executor
    }

    /// Registers (or replaces) the handler of `template_id`.
    pub fn register_handler<F>(&mut self, template_id: impl Into<String>, handler: F)
    where
        F: Fn(&Effect, &BuffDefinition, &BuffContext, &mut BuffStore) -> Result<EffectOutcome, EffectError>
            + Send
            + Sync
            + 'static,
    {
        self.handlers.insert(template_id.into(), Box::new(handler));
    }

    pub fn has_template(&self, template_id: &str) -> bool {
        self.handlers.contains_key(template_id)
    }

    pub fn templates(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Runs every effect of `definition` in declared order.
    ///
    /// Fails fast on the first unresolved template or failing handler.
    pub fn execute(
        &self,
        definition: &BuffDefinition,
        context: &BuffContext,
        store: &mut BuffStore,
    ) -> Result<Vec<EffectOutcome>, EffectError> {
        definition
            .effects
            .iter()
            .map(|effect| {
                let handler = self
                    .handlers
                    .get(&effect.template_id)
                    .ok_or_else(|| EffectError::UnknownTemplate(effect.template_id.clone()))?;
                trace!(
                    target: "sim::buff",
                    buff_id = %definition.id,
                    template = %effect.template_id,
                    "running effect"
                );
                handler(effect, definition, context, store)
            })
            .collect()
    }
}

impl Default for EffectExecutor {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl std::fmt::Debug for EffectExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut templates: Vec<_> = self.templates().collect();
        templates.sort_unstable();
        f.debug_struct("EffectExecutor")
            .field("templates", &templates)
            .finish()
    }
}

fn apply_buff(
    effect: &Effect,
    definition: &BuffDefinition,
    context: &BuffContext,
    store: &mut BuffStore,
) -> Result<EffectOutcome, EffectError> {
    let EffectParams::ApplyBuff(params) = EffectParams::parse(effect)? else {
        return Err(EffectError::Failed {
            template_id: effect.template_id.clone(),
            message: "apply_buff handler bound to another template".into(),
        });
    };

    let owners = match params.owner {
        Some(owner) => vec![owner],
        None => definition.resolve_targets(context),
    };

    let mut metadata = Map::new();
    if !params.modifiers.is_empty() {
        let modifiers = params
            .modifiers
            .into_iter()
            .map(|(name, value)| (name, Value::from(value)))
            .collect();
        metadata.insert(MODIFIERS_KEY.to_string(), Value::Object(modifiers));
    }

    let targets = owners
        .into_iter()
        .map(|owner| {
            let stacks = store.apply(definition, &owner, metadata.clone());
            AppliedBuff { owner, stacks }
        })
        .collect();
    Ok(EffectOutcome::Applied { targets })
}

fn remove_buff(
    effect: &Effect,
    definition: &BuffDefinition,
    context: &BuffContext,
    store: &mut BuffStore,
) -> Result<EffectOutcome, EffectError> {
    let EffectParams::RemoveBuff(params) = EffectParams::parse(effect)? else {
        return Err(EffectError::Failed {
            template_id: effect.template_id.clone(),
            message: "remove_buff handler bound to another template".into(),
        });
    };

    let owner = params
        .owner
        .or_else(|| context.actor_id.clone())
        .ok_or_else(|| EffectError::InvalidParams {
            template_id: effect.template_id.clone(),
            message: "no owner given and the context has no actor".into(),
        })?;
    let buff_id = params.buff_id.unwrap_or_else(|| definition.id.clone());
    let count = store.remove(&owner, |instance| instance.buff_id == buff_id);
    Ok(EffectOutcome::Removed { owner, count })
}
