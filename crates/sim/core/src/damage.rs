//! Damage math collaborator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::actor::CombatStats;
use crate::anomaly::{AnomalyActivation, AnomalySnapshot, Disorder, ElementType, PolarityDisorder};

/// Ticks per simulated second.
pub const TICKS_PER_SECOND: f64 = 60.0;

/// Buff modifier names the standard model reads.
pub mod modifier {
    pub const DAMAGE_BONUS: &str = "damage_bonus";
    pub const CRIT_RATE: &str = "crit_rate";
    pub const CRIT_DAMAGE: &str = "crit_damage";
}

/// Expected and on-crit damage of one settlement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageResult {
    pub expected: f64,
    pub critical: f64,
}

impl DamageResult {
    /// Damage that cannot crit.
    pub fn flat(value: f64) -> Self {
        Self {
            expected: value,
            critical: value,
        }
    }
}

pub type Modifiers = BTreeMap<String, f64>;

pub trait DamageModel: Send {
    fn hit(&self, stats: &CombatStats, ratio: f64, modifiers: &Modifiers) -> DamageResult;

    fn anomaly(&self, activation: &AnomalyActivation, modifiers: &Modifiers) -> DamageResult;

    fn disorder(&self, disorder: &Disorder, modifiers: &Modifiers) -> DamageResult;

    /// One settlement of the dot left by `activation`.
    fn dot_tick(&self, activation: &AnomalyActivation, modifiers: &Modifiers) -> DamageResult;

    fn polarity_disorder(&self, record: &PolarityDisorder, modifiers: &Modifiers) -> DamageResult;

    fn special_activation(
        &self,
        element: ElementType,
        snapshot: &AnomalySnapshot,
        ratio: f64,
        modifiers: &Modifiers,
    ) -> DamageResult;
}

/// Default formulas.
///
/// Anomaly damage scales with the settled snapshot's attack, proficiency
/// (per 100 points) and level. Disorder damage adds a per-second bonus for
/// the time the retiring anomaly still had left.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardDamageModel;

impl StandardDamageModel {
    /// Total multiplier of a full anomaly.
    pub fn anomaly_ratio(element: ElementType) -> f64 {
        match element {
            ElementType::Physical => 7.13,
            ElementType::Fire => 10.0,
            ElementType::Ice => 5.0,
            ElementType::Electric => 12.5,
            ElementType::Ether => 12.5,
            ElementType::Frost => 5.0,
            ElementType::AuricInk => 12.5,
        }
    }

    /// Multiplier of one dot settlement.
    pub fn dot_ratio(element: ElementType) -> f64 {
        match element {
            ElementType::Fire => 0.5,
            ElementType::Electric => 1.25,
            ElementType::Ether | ElementType::AuricInk => 0.625,
            ElementType::Physical | ElementType::Ice | ElementType::Frost => 0.0,
        }
    }

    /// Base and per-remaining-second multipliers of a disorder.
    pub fn disorder_ratio(element: ElementType) -> (f64, f64) {
        match element {
            ElementType::Physical => (4.5, 0.075),
            ElementType::Fire => (4.5, 1.0),
            ElementType::Ice => (4.5, 0.075),
            ElementType::Electric => (4.5, 1.25),
            ElementType::Ether => (4.5, 1.25),
            ElementType::Frost => (6.0, 0.75),
            ElementType::AuricInk => (4.5, 1.25),
        }
    }

    fn bonus(modifiers: &Modifiers, name: &str) -> f64 {
        modifiers.get(name).copied().unwrap_or(0.0)
    }

    fn anomaly_base(snapshot: &AnomalySnapshot, ratio: f64, modifiers: &Modifiers) -> f64 {
        let level_factor = 1.0 + (snapshot.level() - 1.0).max(0.0) / 59.0;
        snapshot.attack()
            * ratio
            * (snapshot.proficiency() / 100.0)
            * level_factor
            * (1.0 + Self::bonus(modifiers, modifier::DAMAGE_BONUS))
    }

    fn disorder_multiplier(element: ElementType, remaining_ticks: u64) -> f64 {
        let (base, per_second) = Self::disorder_ratio(element);
        base + per_second * (remaining_ticks as f64 / TICKS_PER_SECOND).floor()
    }
}

impl DamageModel for StandardDamageModel {
    fn hit(&self, stats: &CombatStats, ratio: f64, modifiers: &Modifiers) -> DamageResult {
        let base =
            stats.attack * ratio * (1.0 + Self::bonus(modifiers, modifier::DAMAGE_BONUS));
        let crit_rate = (stats.crit_rate + Self::bonus(modifiers, modifier::CRIT_RATE)).clamp(0.0, 1.0);
        let crit_damage = stats.crit_damage + Self::bonus(modifiers, modifier::CRIT_DAMAGE);
        DamageResult {
            expected: base * (1.0 + crit_rate * crit_damage),
            critical: base * (1.0 + crit_damage),
        }
    }

    fn anomaly(&self, activation: &AnomalyActivation, modifiers: &Modifiers) -> DamageResult {
        let ratio = Self::anomaly_ratio(activation.element);
        DamageResult::flat(Self::anomaly_base(&activation.snapshot, ratio, modifiers))
    }

    fn disorder(&self, disorder: &Disorder, modifiers: &Modifiers) -> DamageResult {
        let ratio = Self::disorder_multiplier(disorder.retiring, disorder.remaining_ticks);
        DamageResult::flat(Self::anomaly_base(&disorder.snapshot, ratio, modifiers))
    }

    fn dot_tick(&self, activation: &AnomalyActivation, modifiers: &Modifiers) -> DamageResult {
        let ratio = Self::dot_ratio(activation.element);
        DamageResult::flat(Self::anomaly_base(&activation.snapshot, ratio, modifiers))
    }

    fn polarity_disorder(&self, record: &PolarityDisorder, modifiers: &Modifiers) -> DamageResult {
        let ratio = Self::disorder_multiplier(record.element, record.remaining_ticks) * record.ratio;
        DamageResult::flat(Self::anomaly_base(&record.snapshot, ratio, modifiers))
    }

    fn special_activation(
        &self,
        element: ElementType,
        snapshot: &AnomalySnapshot,
        ratio: f64,
        modifiers: &Modifiers,
    ) -> DamageResult {
        let ratio = Self::anomaly_ratio(element) * ratio;
        DamageResult::flat(Self::anomaly_base(snapshot, ratio, modifiers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::AttackerSnapshot;
    use crate::types::Tick;

    fn snapshot() -> AnomalySnapshot {
        let mut snapshot = AnomalySnapshot::default();
        snapshot.absorb(
            100.0,
            &AttackerSnapshot {
                attack: 1000.0,
                anomaly_proficiency: 100.0,
                level: 1.0,
            },
        );
        snapshot
    }

    #[test]
    fn hit_reads_summed_modifiers() {
        let stats = CombatStats {
            attack: 1000.0,
            crit_rate: 0.5,
            crit_damage: 1.0,
            ..CombatStats::default()
        };
        let plain = StandardDamageModel.hit(&stats, 1.0, &Modifiers::new());
        assert_eq!(plain.critical, 2000.0);
        assert_eq!(plain.expected, 1500.0);

        let mut modifiers = Modifiers::new();
        modifiers.insert(modifier::DAMAGE_BONUS.into(), 0.5);
        modifiers.insert(modifier::CRIT_RATE.into(), 0.9);
        let boosted = StandardDamageModel.hit(&stats, 1.0, &modifiers);
        assert_eq!(boosted.expected, 3000.0);
    }

    #[test]
    fn disorder_grows_with_remaining_time() {
        let disorder = |remaining_ticks| Disorder {
            retiring: ElementType::Fire,
            activating: ElementType::Physical,
            snapshot: snapshot(),
            remaining_ticks,
            tick: Tick(0),
            source: None,
        };
        let short = StandardDamageModel.disorder(&disorder(0), &Modifiers::new());
        let long = StandardDamageModel.disorder(&disorder(600), &Modifiers::new());
        assert_eq!(short.expected, 4500.0);
        assert_eq!(long.expected, 14500.0);
        assert_eq!(long.expected, long.critical);
    }
}
