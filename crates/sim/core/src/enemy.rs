//! Target-side state reported with every damage record.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::anomaly::ElementType;
use crate::types::Tick;

/// Snapshot of the enemy attached to report records.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EnemyStatus {
    pub stun: f64,
    pub stunned: bool,
    pub stunned_until: Option<Tick>,
    pub active_anomaly: Option<ElementType>,
    #[serde(default)]
    pub frozen: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Enemy {
    /// Stun needed to enter the stunned state.
    pub stun_max: f64,
    pub stun_duration_ticks: u64,
    pub stun: f64,
    pub stunned_until: Option<Tick>,
}

impl Default for Enemy {
    fn default() -> Self {
        Self {
            stun_max: 1000.0,
            stun_duration_ticks: 600,
            stun: 0.0,
            stunned_until: None,
        }
    }
}

impl Enemy {
    pub fn is_stunned(&self) -> bool {
        self.stunned_until.is_some()
    }

    /// Accumulates stun; returns true when this call stunned the enemy.
    pub fn add_stun(&mut self, amount: f64, now: Tick) -> bool {
        if amount <= 0.0 || self.is_stunned() {
            return false;
        }
        self.stun += amount;
        if self.stun < self.stun_max {
            return false;
        }
        self.stun = 0.0;
        self.stunned_until = Some(now + self.stun_duration_ticks);
        debug!(target: "sim::enemy", tick = now.0, "enemy stunned");
        true
    }

    /// Ends the stunned state; returns whether the enemy was stunned.
    pub fn end_stun(&mut self) -> bool {
        self.stunned_until.take().is_some()
    }

    /// Recovers from a stun whose duration ran out.
    pub fn advance(&mut self, now: Tick) {
        if self.stunned_until.is_some_and(|until| until <= now) {
            self.stunned_until = None;
            debug!(target: "sim::enemy", tick = now.0, "enemy recovered from stun");
        }
    }

    pub fn status(&self, active_anomaly: Option<ElementType>) -> EnemyStatus {
        EnemyStatus {
            stun: self.stun,
            stunned: self.is_stunned(),
            stunned_until: self.stunned_until,
            active_anomaly,
            frozen: false,
        }
    }
}
