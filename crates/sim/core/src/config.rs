use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::anomaly::ElementType;

/// Simulation constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Upper bound on re-settle passes inside one `settle(tick)` call.
    /// Exceeding it means handlers keep producing due events forever.
    pub max_cascade_depth: usize,

    /// Duration subtracted from every live buff instance per tick.
    pub buff_tick_delta: f64,

    pub anomaly: AnomalyConfig,
}

impl SimConfig {
    pub const DEFAULT_MAX_CASCADE_DEPTH: usize = 64;
    pub const DEFAULT_BUFF_TICK_DELTA: f64 = 1.0;

    pub fn new() -> Self {
        Self {
            max_cascade_depth: Self::DEFAULT_MAX_CASCADE_DEPTH,
            buff_tick_delta: Self::DEFAULT_BUFF_TICK_DELTA,
            anomaly: AnomalyConfig::default(),
        }
    }

    pub fn with_max_cascade_depth(mut self, depth: usize) -> Self {
        self.max_cascade_depth = depth;
        self
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Thresholds and timings of the anomaly accumulation bars.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Buildup required to activate an anomaly.
    pub max_buildup: f64,

    /// Minimum ticks between two activations of the same element.
    pub cooldown_ticks: u64,

    /// How long an activated anomaly stays Active on the target.
    pub active_duration_ticks: u64,

    /// Per-element buildup thresholds overriding `max_buildup`.
    pub max_buildup_overrides: BTreeMap<ElementType, f64>,

    /// Per-element Active durations overriding `active_duration_ticks`.
    pub duration_overrides: BTreeMap<ElementType, u64>,

    /// Interval of periodic dots (burn, corruption, auric ink).
    pub dot_interval_ticks: u64,

    /// Minimum ticks between two shock settlements.
    pub shock_cooldown_ticks: u64,

    /// How long a freeze holds the shatter back.
    pub freeze_ticks: u64,
}

impl AnomalyConfig {
    pub const DEFAULT_MAX_BUILDUP: f64 = 600.0;
    pub const DEFAULT_COOLDOWN_TICKS: u64 = 180;
    pub const DEFAULT_ACTIVE_DURATION_TICKS: u64 = 600;
    pub const DEFAULT_DOT_INTERVAL_TICKS: u64 = 30;
    pub const DEFAULT_SHOCK_COOLDOWN_TICKS: u64 = 60;
    pub const DEFAULT_FREEZE_TICKS: u64 = 60;

    pub fn max_buildup_for(&self, element: ElementType) -> f64 {
        self.max_buildup_overrides
            .get(&element)
            .copied()
            .unwrap_or(self.max_buildup)
    }

    pub fn duration_for(&self, element: ElementType) -> u64 {
        self.duration_overrides
            .get(&element)
            .copied()
            .unwrap_or(self.active_duration_ticks)
    }
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            max_buildup: Self::DEFAULT_MAX_BUILDUP,
            cooldown_ticks: Self::DEFAULT_COOLDOWN_TICKS,
            active_duration_ticks: Self::DEFAULT_ACTIVE_DURATION_TICKS,
            max_buildup_overrides: BTreeMap::new(),
            duration_overrides: BTreeMap::new(),
            dot_interval_ticks: Self::DEFAULT_DOT_INTERVAL_TICKS,
            shock_cooldown_ticks: Self::DEFAULT_SHOCK_COOLDOWN_TICKS,
            freeze_ticks: Self::DEFAULT_FREEZE_TICKS,
        }
    }
}
