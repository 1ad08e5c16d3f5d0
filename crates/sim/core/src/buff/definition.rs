//! Buff definitions: the declarative records the registry stores.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Condition, ConfigError, EffectParams};
use crate::types::{BuffId, OwnerId};

/// How a re-application to the same owner combines with a live instance.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StackingRule {
    /// Reset duration, keep a single stack.
    #[default]
    Refresh,
    /// Add a stack up to `max_stacks` and renew duration.
    Stack,
    /// Every application is its own separately expiring record.
    Independent,
}

/// Binds a buff to an event kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub event_type: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl Trigger {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            parameters: Map::new(),
        }
    }
}

/// A named operation run when all conditions of its buff hold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub template_id: String,
    /// Loose parameter bag; unknown keys are kept.
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl Effect {
    pub fn new(template_id: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
            parameters: Map::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetScope {
    /// The participant that produced the event.
    #[default]
    #[serde(rename = "self", alias = "actor")]
    Actor,
    /// Explicit targets carried by the dispatch context.
    Targets,
    /// Every participant, narrowed by the selector's filters.
    Team,
    Enemy,
}

/// Describes which owners receive a buff's instances.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetSelector {
    #[serde(default)]
    pub scope: TargetScope,
    /// Attribute filters. A candidate passes when every key of any one
    /// filter equals the candidate's attribute of the same name.
    #[serde(default)]
    pub filters: Vec<Map<String, Value>>,
}

impl TargetSelector {
    pub fn new(scope: TargetScope) -> Self {
        Self {
            scope,
            filters: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: Map<String, Value>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn admits(&self, attributes: &Value) -> bool {
        self.filters.is_empty()
            || self.filters.iter().any(|filter| {
                filter
                    .iter()
                    .all(|(key, expected)| attributes.get(key) == Some(expected))
            })
    }
}

/// Top-level registration entity for a buff.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuffDefinition {
    #[serde(alias = "buff_id")]
    pub id: BuffId,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_max_stacks")]
    pub max_stacks: u32,
    /// `None` means the buff never expires on its own.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub stacking_rule: StackingRule,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
    /// AND-ed; an empty list always matches.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub target_selector: TargetSelector,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

fn default_max_stacks() -> u32 {
    1
}

impl BuffDefinition {
    pub fn new(id: impl Into<BuffId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tags: Vec::new(),
            max_stacks: default_max_stacks(),
            duration: None,
            stacking_rule: StackingRule::default(),
            triggers: Vec::new(),
            conditions: Vec::new(),
            effects: Vec::new(),
            target_selector: TargetSelector::default(),
            metadata: Map::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_max_stacks(mut self, max_stacks: u32) -> Self {
        self.max_stacks = max_stacks;
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_stacking(mut self, rule: StackingRule) -> Self {
        self.stacking_rule = rule;
        self
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_target(mut self, selector: TargetSelector) -> Self {
        self.target_selector = selector;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn triggers_on(&self, event_type: &str) -> bool {
        self.triggers.iter().any(|t| t.event_type == event_type)
    }

    /// Checks the definition is complete enough to register.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let buff_id = || self.id.clone();

        if self.id.trim().is_empty() {
            return Err(ConfigError::EmptyId);
        }
        if self.max_stacks == 0 {
            return Err(ConfigError::InvalidMaxStacks { buff_id: buff_id() });
        }
        if let Some(duration) = self.duration
            && !(duration.is_finite() && duration > 0.0)
        {
            return Err(ConfigError::InvalidDuration {
                buff_id: buff_id(),
                duration,
            });
        }
        if self.triggers.is_empty() {
            return Err(ConfigError::MissingTrigger { buff_id: buff_id() });
        }
        if self.triggers.iter().any(|t| t.event_type.trim().is_empty()) {
            return Err(ConfigError::EmptyTrigger { buff_id: buff_id() });
        }
        for condition in &self.conditions {
            condition
                .validate()
                .map_err(|reason| ConfigError::InvalidCondition {
                    buff_id: buff_id(),
                    reason,
                })?;
        }
        for effect in &self.effects {
            let invalid = |reason: String| ConfigError::InvalidEffect {
                buff_id: buff_id(),
                template_id: effect.template_id.clone(),
                reason,
            };
            if effect.template_id.trim().is_empty() {
                return Err(invalid("empty template id".into()));
            }
            EffectParams::parse(effect).map_err(|e| invalid(e.to_string()))?;
        }
        Ok(())
    }

    /// Owner ids this definition targets when no explicit owner is given.
    pub fn resolve_targets(&self, context: &super::BuffContext) -> Vec<OwnerId> {
        let selector = &self.target_selector;
        match selector.scope {
            TargetScope::Actor => context.actor_id.iter().cloned().collect(),
            TargetScope::Targets => context.targets.clone(),
            TargetScope::Enemy => vec![crate::types::ENEMY_OWNER.to_string()],
            TargetScope::Team => context
                .team
                .iter()
                .filter(|(_, attributes)| selector.admits(attributes))
                .map(|(id, _)| id.clone())
                .collect(),
        }
    }
}
