//! Participants: the character-like collaborators the engine talks to.
//!
//! The engine only needs a name, combat stats, an attribute mapping for
//! buff conditions and a couple of side-effect hooks. Concrete character
//! content lives outside this crate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::anomaly::AttackerSnapshot;
use crate::event::EventKind;
use crate::types::{OwnerId, Tick};

/// Stats read when a participant's hit is settled.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatStats {
    pub attack: f64,
    pub anomaly_proficiency: f64,
    pub level: f64,
    pub crit_rate: f64,
    pub crit_damage: f64,
}

impl Default for CombatStats {
    fn default() -> Self {
        Self {
            attack: 1000.0,
            anomaly_proficiency: 100.0,
            level: 60.0,
            crit_rate: 0.05,
            crit_damage: 0.5,
        }
    }
}

impl CombatStats {
    pub fn snapshot(&self) -> AttackerSnapshot {
        AttackerSnapshot {
            attack: self.attack,
            anomaly_proficiency: self.anomaly_proficiency,
            level: self.level,
        }
    }
}

pub trait Participant: Send {
    fn name(&self) -> &str;

    fn stats(&self) -> CombatStats;

    /// Mapping exposed to buff conditions as `actor.*`.
    fn attributes(&self) -> Value;

    fn update_resources(&mut self, energy: f64, decibel: f64);

    /// Called after an event involving this participant has been settled.
    fn notify(&mut self, _kind: EventKind, _tick: Tick) {}
}

/// Plain participant driven entirely by data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BasicParticipant {
    pub name: OwnerId,
    #[serde(default)]
    pub stats: CombatStats,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub energy: f64,
    #[serde(default)]
    pub decibel: f64,
    /// Settled events per kind; one entry per kind at most.
    #[serde(skip)]
    pub notified: BTreeMap<EventKind, u64>,
    #[serde(skip)]
    pub last_notified: Option<Tick>,
}

impl BasicParticipant {
    pub fn new(name: impl Into<OwnerId>, stats: CombatStats) -> Self {
        Self {
            name: name.into(),
            stats,
            role: None,
            energy: 0.0,
            decibel: 0.0,
            notified: BTreeMap::new(),
            last_notified: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn notified(&self, kind: EventKind) -> u64 {
        self.notified.get(&kind).copied().unwrap_or(0)
    }
}

impl Participant for BasicParticipant {
    fn name(&self) -> &str {
        &self.name
    }

    fn stats(&self) -> CombatStats {
        self.stats
    }

    fn attributes(&self) -> Value {
        json!({
            "name": self.name,
            "role": self.role,
            "level": self.stats.level,
            "attack": self.stats.attack,
            "anomaly_proficiency": self.stats.anomaly_proficiency,
            "energy": self.energy,
            "decibel": self.decibel,
        })
    }

    fn update_resources(&mut self, energy: f64, decibel: f64) {
        self.energy = (self.energy + energy).max(0.0);
        self.decibel = (self.decibel + decibel).max(0.0);
    }

    fn notify(&mut self, kind: EventKind, tick: Tick) {
        *self.notified.entry(kind).or_default() += 1;
        self.last_notified = Some(tick);
    }
}

/// Participants of one simulation, looked up by name.
#[derive(Default)]
pub struct Roster {
    members: Vec<Box<dyn Participant>>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a participant, replacing any previous one with the same name.
    pub fn insert(&mut self, participant: Box<dyn Participant>) {
        match self.position(participant.name()) {
            Some(index) => self.members[index] = participant,
            None => self.members.push(participant),
        }
    }

    pub fn with(mut self, participant: impl Participant + 'static) -> Self {
        self.insert(Box::new(participant));
        self
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|member| member.name() == name)
    }

    pub fn get(&self, name: &str) -> Option<&dyn Participant> {
        self.members
            .iter()
            .find(|member| member.name() == name)
            .map(|member| member.as_ref())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn Participant + 'static)> {
        self.members
            .iter_mut()
            .find(|member| member.name() == name)
            .map(|member| member.as_mut())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|member| member.name())
    }

    /// Every member with its attribute mapping.
    pub fn team_view(&self) -> Vec<(OwnerId, Value)> {
        self.members
            .iter()
            .map(|member| (member.name().to_string(), member.attributes()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl std::fmt::Debug for Roster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_replaces_by_name_and_updates_resources() {
        let mut roster = Roster::new()
            .with(BasicParticipant::new("alice", CombatStats::default()))
            .with(BasicParticipant::new("bea", CombatStats::default()).with_role("support"));
        roster.insert(Box::new(BasicParticipant::new(
            "alice",
            CombatStats {
                attack: 3000.0,
                ..CombatStats::default()
            },
        )));
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.get("alice").map(|p| p.stats().attack), Some(3000.0));

        roster.get_mut("bea").unwrap().update_resources(20.0, -5.0);
        let attributes = roster.get("bea").unwrap().attributes();
        assert_eq!(attributes["energy"], 20.0);
        assert_eq!(attributes["decibel"], 0.0);
        assert_eq!(attributes["role"], "support");
        assert!(roster.get("nobody").is_none());
    }

    #[test]
    fn notifications_are_counted_per_kind() {
        let mut hero = BasicParticipant::new("hero", CombatStats::default());
        for tick in 0..10_000 {
            hero.notify(EventKind::SkillHit, Tick(tick));
            if tick % 2 == 0 {
                hero.notify(EventKind::DelayedAssist, Tick(tick));
            }
        }

        assert_eq!(hero.notified.len(), 2);
        assert_eq!(hero.notified(EventKind::SkillHit), 10_000);
        assert_eq!(hero.notified(EventKind::DelayedAssist), 5_000);
        assert_eq!(hero.notified(EventKind::Refresh), 0);
        assert_eq!(hero.last_notified, Some(Tick(9_999)));
    }
}
