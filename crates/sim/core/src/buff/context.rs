use serde_json::{Map, Value, json};

use crate::types::{OwnerId, Tick};

/// Read-only view of one dispatch: the event, its actor and any extras.
///
/// Conditions address it through dotted paths rooted at `event`, `actor`,
/// `targets` and `tick`. Extras sit at the root next to them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuffContext {
    pub tick: Tick,
    pub event: Value,
    pub actor_id: Option<OwnerId>,
    pub actor: Value,
    pub targets: Vec<OwnerId>,
    /// Candidate owners with their attributes, for team-scoped selectors.
    pub team: Vec<(OwnerId, Value)>,
    pub extra: Map<String, Value>,
}

impl BuffContext {
    pub fn new(tick: Tick, event: Value) -> Self {
        Self {
            tick,
            event,
            ..Self::default()
        }
    }

    pub fn with_actor(mut self, id: impl Into<OwnerId>, attributes: Value) -> Self {
        self.actor_id = Some(id.into());
        self.actor = attributes;
        self
    }

    pub fn with_targets(mut self, targets: Vec<OwnerId>) -> Self {
        self.targets = targets;
        self
    }

    pub fn with_team(mut self, team: Vec<(OwnerId, Value)>) -> Self {
        self.team = team;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Builds the mapping conditions are evaluated against.
    ///
    /// Extras are merged into the root; the reserved keys win on a clash.
    pub fn mapping(&self) -> Value {
        let mut root = self.extra.clone();
        root.insert("tick".into(), json!(self.tick.0));
        root.insert("event".into(), self.event.clone());
        root.insert("actor".into(), self.actor.clone());
        root.insert("actor_id".into(), json!(self.actor_id));
        root.insert("targets".into(), json!(self.targets));
        Value::Object(root)
    }
}
