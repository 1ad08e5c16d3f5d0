//! Kind-specific event payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Event;
use crate::anomaly::ElementType;
use crate::types::{BuffId, OwnerId};

/// One landed hit of a skill.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkillHitEvent {
    pub attacker: OwnerId,
    pub skill_id: String,
    pub element: ElementType,
    /// Damage multiplier applied to the attacker's attack.
    #[serde(default = "default_ratio")]
    pub ratio: f64,
    /// Anomaly buildup added to `element`'s bar.
    #[serde(default)]
    pub buildup: f64,
    #[serde(default)]
    pub stun: f64,
    /// Free-form fields exposed to buff conditions as `event.payload.*`.
    #[serde(default)]
    pub payload: Value,
}

fn default_ratio() -> f64 {
    1.0
}

impl SkillHitEvent {
    pub fn new(attacker: impl Into<OwnerId>, skill_id: impl Into<String>, element: ElementType) -> Self {
        Self {
            attacker: attacker.into(),
            skill_id: skill_id.into(),
            element,
            ratio: default_ratio(),
            buildup: 0.0,
            stun: 0.0,
            payload: Value::Null,
        }
    }

    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.ratio = ratio;
        self
    }

    pub fn with_buildup(mut self, buildup: f64) -> Self {
        self.buildup = buildup;
        self
    }

    pub fn with_stun(mut self, stun: f64) -> Self {
        self.stun = stun;
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Scheduled settlement of the dot `serial`; stale when that dot is gone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DotTickEvent {
    pub element: ElementType,
    pub serial: u64,
}

/// Extra settlement of the Active anomaly, scaled by `ratio`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpecialActivationEvent {
    pub source: OwnerId,
    pub ratio: f64,
}

/// Settles a polarity disorder of whatever anomaly is Active.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpecialAssaultEvent {
    pub source: OwnerId,
    pub ratio: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceUpdate {
    pub participant: OwnerId,
    #[serde(default)]
    pub energy: f64,
    #[serde(default)]
    pub decibel: f64,
}

/// Resource updates applied to named participants.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RefreshEvent {
    pub updates: Vec<ResourceUpdate>,
}

/// A participant's assist that fires at a later tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DelayedAssistEvent {
    pub participant: OwnerId,
    #[serde(default)]
    pub assist: String,
}

/// A deferred action; `follow_up` is enqueued for the same tick when it fires.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DelayedActionEvent {
    pub actor: OwnerId,
    pub action: String,
    #[serde(default)]
    pub follow_up: Option<Box<Event>>,
}

/// Ends the enemy's stunned state early.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ForcedTerminationEvent {
    #[serde(default)]
    pub reason: String,
}

/// Pre-resolved buff application for `owner`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuffSettlementEvent {
    pub buff_id: BuffId,
    pub owner: OwnerId,
}
