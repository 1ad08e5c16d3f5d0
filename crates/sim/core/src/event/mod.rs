//! Closed set of events the scheduler settles.
//!
//! Every variant maps to exactly one [`EventKind`], and every kind is served
//! by exactly one registered handler.
mod payload;
mod scheduled;

use serde::{Deserialize, Serialize};

use crate::anomaly::{AnomalyActivation, Disorder, PolarityDisorder};

pub use payload::{
    BuffSettlementEvent, DelayedActionEvent, DelayedAssistEvent, DotTickEvent,
    ForcedTerminationEvent, RefreshEvent, ResourceUpdate, SkillHitEvent, SpecialActivationEvent,
    SpecialAssaultEvent,
};
pub use scheduled::ScheduledEvent;

/// A unit of work settled inside one tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    SkillHit(SkillHitEvent),
    AnomalyActivation(AnomalyActivation),
    Disorder(Disorder),
    PolarityDisorder(PolarityDisorder),
    DotTick(DotTickEvent),
    SpecialActivation(SpecialActivationEvent),
    Refresh(RefreshEvent),
    DelayedAssist(DelayedAssistEvent),
    DelayedAction(DelayedActionEvent),
    ForcedTermination(ForcedTerminationEvent),
    SpecialAssault(SpecialAssaultEvent),
    BuffSettlement(BuffSettlementEvent),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::SkillHit(_) => EventKind::SkillHit,
            Self::AnomalyActivation(_) => EventKind::AnomalyActivation,
            Self::Disorder(_) => EventKind::Disorder,
            Self::PolarityDisorder(_) => EventKind::PolarityDisorder,
            Self::DotTick(_) => EventKind::DotTick,
            Self::SpecialActivation(_) => EventKind::SpecialActivation,
            Self::Refresh(_) => EventKind::Refresh,
            Self::DelayedAssist(_) => EventKind::DelayedAssist,
            Self::DelayedAction(_) => EventKind::DelayedAction,
            Self::ForcedTermination(_) => EventKind::ForcedTermination,
            Self::SpecialAssault(_) => EventKind::SpecialAssault,
            Self::BuffSettlement(_) => EventKind::BuffSettlement,
        }
    }
}

/// Discriminant of [`Event`], used for handler lookup and error reporting.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EventKind {
    SkillHit,
    AnomalyActivation,
    Disorder,
    PolarityDisorder,
    DotTick,
    SpecialActivation,
    Refresh,
    DelayedAssist,
    DelayedAction,
    ForcedTermination,
    SpecialAssault,
    BuffSettlement,
}

impl EventKind {
    pub const ALL: [EventKind; 12] = [
        Self::SkillHit,
        Self::AnomalyActivation,
        Self::Disorder,
        Self::PolarityDisorder,
        Self::DotTick,
        Self::SpecialActivation,
        Self::Refresh,
        Self::DelayedAssist,
        Self::DelayedAction,
        Self::ForcedTermination,
        Self::SpecialAssault,
        Self::BuffSettlement,
    ];

    /// Buff settlements are always processed before any other due event.
    pub const fn is_buff_settlement(self) -> bool {
        matches!(self, Self::BuffSettlement)
    }

    /// Trigger name under which buffs bind to this kind of event.
    pub const fn trigger(self) -> &'static str {
        match self {
            Self::SkillHit => "skill.hit",
            Self::AnomalyActivation => "anomaly.activate",
            Self::Disorder => "anomaly.disorder",
            Self::PolarityDisorder => "anomaly.polarity_disorder",
            Self::DotTick => "anomaly.dot",
            Self::SpecialActivation => "anomaly.special_activation",
            Self::Refresh => "resource.refresh",
            Self::DelayedAssist => "assist.quick",
            Self::DelayedAction => "action.delayed",
            Self::ForcedTermination => "stun.terminated",
            Self::SpecialAssault => "special.assault",
            Self::BuffSettlement => "buff.settle",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::ElementType;

    #[test]
    fn kinds_parse_from_snake_case() {
        for kind in EventKind::ALL {
            assert_eq!(kind.as_ref().parse::<EventKind>().ok(), Some(kind));
        }
        assert_eq!("Skill_Hit".parse::<EventKind>().ok(), Some(EventKind::SkillHit));
    }

    #[test]
    fn event_serializes_with_kind_tag() {
        let event = Event::SkillHit(SkillHitEvent::new("alice", "basic_1", ElementType::Fire));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "skill_hit");
        assert_eq!(json["attacker"], "alice");

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind(), EventKind::SkillHit);
    }
}
