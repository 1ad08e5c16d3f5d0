//! Per-element accumulation bar.

use serde::{Deserialize, Serialize};

use super::ElementType;
use crate::types::Tick;

/// Attacker stats captured at the moment a hit lands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackerSnapshot {
    pub attack: f64,
    pub anomaly_proficiency: f64,
    pub level: f64,
}

/// Buildup-weighted sums of attacker snapshots.
///
/// Every contribution is weighted by the buildup it added, so an activation
/// reflects who actually filled the bar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalySnapshot {
    pub weight: f64,
    pub attack_sum: f64,
    pub proficiency_sum: f64,
    pub level_sum: f64,
}

impl AnomalySnapshot {
    pub fn absorb(&mut self, buildup: f64, attacker: &AttackerSnapshot) {
        if buildup <= 0.0 {
            return;
        }
        self.weight += buildup;
        self.attack_sum += attacker.attack * buildup;
        self.proficiency_sum += attacker.anomaly_proficiency * buildup;
        self.level_sum += attacker.level * buildup;
    }

    pub fn is_empty(&self) -> bool {
        self.weight <= 0.0
    }

    fn average(&self, sum: f64) -> f64 {
        if self.is_empty() { 0.0 } else { sum / self.weight }
    }

    pub fn attack(&self) -> f64 {
        self.average(self.attack_sum)
    }

    pub fn proficiency(&self) -> f64 {
        self.average(self.proficiency_sum)
    }

    pub fn level(&self) -> f64 {
        self.average(self.level_sum)
    }
}

/// Lifecycle position of one element's bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum AnomalyState {
    /// Below threshold, or threshold reached while the cooldown runs.
    Idle,
    /// Threshold reached and cooldown elapsed.
    Ready,
    /// One live instance on the target.
    Active,
}

/// Accumulation bar for a single element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnomalyBar {
    pub element: ElementType,
    pub accumulation: f64,
    pub max_capacity: f64,
    pub cooldown_ticks: u64,
    /// Tick of the last activation/refresh/disorder resolution.
    pub last_activation: Option<Tick>,
    /// Contributions since the last resolution.
    pub snapshot: AnomalySnapshot,

    pub active: bool,
    pub activated_at: Option<Tick>,
    pub active_until: Option<Tick>,
    /// Snapshot taken when this element last became Active.
    pub active_snapshot: AnomalySnapshot,
}

impl AnomalyBar {
    pub fn new(element: ElementType, max_capacity: f64, cooldown_ticks: u64) -> Self {
        Self {
            element,
            accumulation: 0.0,
            max_capacity,
            cooldown_ticks,
            last_activation: None,
            snapshot: AnomalySnapshot::default(),
            active: false,
            activated_at: None,
            active_until: None,
            active_snapshot: AnomalySnapshot::default(),
        }
    }

    pub fn add_buildup(&mut self, amount: f64, attacker: &AttackerSnapshot) {
        if amount <= 0.0 {
            return;
        }
        self.accumulation += amount;
        self.snapshot.absorb(amount, attacker);
    }

    pub fn is_full(&self) -> bool {
        self.accumulation >= self.max_capacity
    }

    pub fn cooldown_ready(&self, now: Tick) -> bool {
        match self.last_activation {
            None => true,
            Some(last) => now.since(last) >= self.cooldown_ticks,
        }
    }

    pub fn state(&self, now: Tick) -> AnomalyState {
        if self.active {
            AnomalyState::Active
        } else if self.is_full() && self.cooldown_ready(now) {
            AnomalyState::Ready
        } else {
            AnomalyState::Idle
        }
    }

    pub(crate) fn mark_active(&mut self, now: Tick, snapshot: AnomalySnapshot, duration: u64) {
        self.active = true;
        self.activated_at = Some(now);
        self.active_until = Some(now + duration);
        self.active_snapshot = snapshot;
    }

    pub(crate) fn clear_active(&mut self) {
        self.active = false;
        self.active_until = None;
    }

    /// Zeroes accumulation and snapshot and re-arms this bar's cooldown gate.
    pub(crate) fn reset_after_resolution(&mut self, now: Tick) {
        self.accumulation = 0.0;
        self.snapshot = AnomalySnapshot::default();
        self.last_activation = Some(now);
    }
}
