//! Anomaly/disorder state machine.
//!
//! Each element owns one [`AnomalyBar`]. When a bar reaches its threshold
//! with its cooldown elapsed, the machine resolves it against whatever is
//! currently Active on the target:
//!
//! ```text
//!   nothing Active ──────────────► activate            (Activated)
//!   same slot Active ────────────► refresh             (Activated, refreshed)
//!   other slot Active ───────────► Disorder + activate (Disordered)
//! ```
//!
//! Ice and Frost are two element codes sharing one slot, so both may be
//! flagged Active together. Any other combination of two Active elements is
//! an invariant violation.

use bitflags::bitflags;
use thiserror::Error;
use tracing::{debug, info};

use super::{
    AnomalyActivation, AnomalyBar, AnomalyOutcome, AnomalySnapshot, AttackerSnapshot, Disorder,
    ElementType, PolarityDisorder,
};
use crate::config::AnomalyConfig;
use crate::error::{ErrorSeverity, SimError};
use crate::types::{OwnerId, Tick};

bitflags! {
    /// Set of elements currently flagged Active on the target.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ActiveElements: u8 {
        const PHYSICAL  = 1 << 0;
        const FIRE      = 1 << 1;
        const ICE       = 1 << 2;
        const ELECTRIC  = 1 << 3;
        const ETHER     = 1 << 4;
        const FROST     = 1 << 5;
        const AURIC_INK = 1 << 6;

        const ICE_SLOT = Self::ICE.bits() | Self::FROST.bits();
    }
}

impl ActiveElements {
    pub const fn of(element: ElementType) -> Self {
        Self::from_bits_retain(1 << element.code())
    }

    /// Number of logical slots represented by this set.
    pub fn slot_count(self) -> u32 {
        let outside_ice = self.difference(Self::ICE_SLOT).bits().count_ones();
        outside_ice + u32::from(self.intersects(Self::ICE_SLOT))
    }

    pub fn elements(self) -> Vec<ElementType> {
        ElementType::ALL
            .into_iter()
            .filter(|element| self.contains(Self::of(*element)))
            .collect()
    }
}

/// Errors raised by the anomaly state machine.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum AnomalyError {
    #[error("more than one anomaly is Active at once: {elements:?}")]
    MultipleActive { elements: Vec<ElementType> },
}

impl SimError for AnomalyError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MultipleActive { .. } => "ANOMALY_MULTIPLE_ACTIVE",
        }
    }
}

/// Owns all seven bars of one target.
#[derive(Clone, Debug)]
pub struct AnomalyMachine {
    bars: [AnomalyBar; ElementType::COUNT],
    config: AnomalyConfig,
}

impl AnomalyMachine {
    pub fn new(config: AnomalyConfig) -> Self {
        let bars = ElementType::ALL.map(|element| {
            AnomalyBar::new(
                element,
                config.max_buildup_for(element),
                config.cooldown_ticks,
            )
        });
        Self { bars, config }
    }

    pub fn bar(&self, element: ElementType) -> &AnomalyBar {
        &self.bars[element.index()]
    }

    pub fn bars(&self) -> &[AnomalyBar] {
        &self.bars
    }

    #[cfg(test)]
    pub(crate) fn bar_mut(&mut self, element: ElementType) -> &mut AnomalyBar {
        &mut self.bars[element.index()]
    }

    /// Overrides the activation threshold of one element, or of all of them.
    pub fn set_max_buildup(&mut self, value: f64, element: Option<ElementType>) {
        match element {
            Some(element) => self.bars[element.index()].max_capacity = value,
            None => self.bars.iter_mut().for_each(|bar| bar.max_capacity = value),
        }
    }

    pub fn active_set(&self) -> ActiveElements {
        self.bars
            .iter()
            .filter(|bar| bar.active)
            .fold(ActiveElements::empty(), |set, bar| {
                set | ActiveElements::of(bar.element)
            })
    }

    /// Returns the element occupying the Active slot, if any.
    ///
    /// When Ice and Frost are both flagged, the most recently activated one
    /// identifies the slot.
    pub fn active_element(&self) -> Result<Option<ElementType>, AnomalyError> {
        let set = self.active_set();
        if set.slot_count() > 1 {
            return Err(AnomalyError::MultipleActive {
                elements: set.elements(),
            });
        }
        Ok(self
            .bars
            .iter()
            .filter(|bar| bar.active)
            .max_by_key(|bar| (bar.activated_at, bar.element.code()))
            .map(|bar| bar.element))
    }

    /// Adds buildup to `element`'s bar and resolves it if it became Ready.
    ///
    /// Returns `Ok(None)` when the bar is below threshold or still cooling
    /// down. After any resolution the bar's accumulation and snapshot are
    /// zeroed and only that element's cooldown gate re-arms.
    pub fn accumulate(
        &mut self,
        element: ElementType,
        amount: f64,
        attacker: &AttackerSnapshot,
        now: Tick,
        source: Option<OwnerId>,
    ) -> Result<Option<AnomalyOutcome>, AnomalyError> {
        let bar = &mut self.bars[element.index()];
        bar.add_buildup(amount, attacker);
        if !bar.is_full() || !bar.cooldown_ready(now) {
            return Ok(None);
        }

        let current = self.active_element()?;
        let snapshot = self.bars[element.index()].snapshot;
        let outcome = match current {
            Some(active) if !active.shares_slot_with(element) => {
                let disorder = self.retire(active, element, now, source.clone());
                let activation = self.activate(element, snapshot, now, false, source);
                info!(
                    target: "sim::anomaly",
                    tick = now.0,
                    retiring = %disorder.retiring,
                    activating = %element,
                    "disorder triggered"
                );
                AnomalyOutcome::Disordered {
                    disorder,
                    activation,
                }
            }
            Some(_) => {
                debug!(target: "sim::anomaly", tick = now.0, element = %element, "anomaly refreshed");
                AnomalyOutcome::Activated(self.activate(element, snapshot, now, true, source))
            }
            None => {
                info!(target: "sim::anomaly", tick = now.0, element = %element, "anomaly activated");
                AnomalyOutcome::Activated(self.activate(element, snapshot, now, false, source))
            }
        };

        self.bars[element.index()].reset_after_resolution(now);
        Ok(Some(outcome))
    }

    fn activate(
        &mut self,
        element: ElementType,
        snapshot: AnomalySnapshot,
        now: Tick,
        refreshed: bool,
        source: Option<OwnerId>,
    ) -> AnomalyActivation {
        let duration = self.config.duration_for(element);
        self.bars[element.index()].mark_active(now, snapshot, duration);
        AnomalyActivation {
            element,
            snapshot,
            tick: now,
            refreshed,
            source,
        }
    }

    /// Clears the whole slot of `retiring` and returns its Disorder record.
    fn retire(
        &mut self,
        retiring: ElementType,
        activating: ElementType,
        now: Tick,
        source: Option<OwnerId>,
    ) -> Disorder {
        let bar = &self.bars[retiring.index()];
        let disorder = Disorder {
            retiring,
            activating,
            snapshot: bar.active_snapshot,
            remaining_ticks: remaining(bar, now),
            tick: now,
            source,
        };
        for bar in self
            .bars
            .iter_mut()
            .filter(|bar| bar.element.shares_slot_with(retiring))
        {
            bar.clear_active();
        }
        disorder
    }

    /// Settles the Active anomaly at `ratio` without retiring it.
    ///
    /// Returns `Ok(None)` when nothing is Active.
    pub fn polarity_disorder(
        &self,
        ratio: f64,
        now: Tick,
        source: Option<OwnerId>,
    ) -> Result<Option<PolarityDisorder>, AnomalyError> {
        let Some(element) = self.active_element()? else {
            return Ok(None);
        };
        let bar = &self.bars[element.index()];
        Ok(Some(PolarityDisorder {
            element,
            snapshot: bar.active_snapshot,
            ratio,
            remaining_ticks: remaining(bar, now),
            tick: now,
            source,
        }))
    }

    /// Clears every Active anomaly whose duration ran out at or before `now`.
    pub fn expire_due(&mut self, now: Tick) -> Vec<ElementType> {
        let mut expired = Vec::new();
        for bar in self.bars.iter_mut().filter(|bar| bar.active) {
            if bar.active_until.is_some_and(|until| until <= now) {
                bar.clear_active();
                expired.push(bar.element);
            }
        }
        if !expired.is_empty() {
            debug!(target: "sim::anomaly", tick = now.0, ?expired, "anomalies expired");
        }
        expired
    }
}

fn remaining(bar: &AnomalyBar, now: Tick) -> u64 {
    bar.active_until.map_or(0, |until| until.since(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::AnomalyState;

    fn config() -> AnomalyConfig {
        AnomalyConfig {
            max_buildup: 100.0,
            cooldown_ticks: 30,
            active_duration_ticks: 600,
            ..AnomalyConfig::default()
        }
    }

    fn attacker() -> AttackerSnapshot {
        AttackerSnapshot {
            attack: 2000.0,
            anomaly_proficiency: 150.0,
            level: 60.0,
        }
    }

    fn fill(machine: &mut AnomalyMachine, element: ElementType, tick: u64) -> Option<AnomalyOutcome> {
        machine
            .accumulate(element, 100.0, &attacker(), Tick(tick), Some("alice".into()))
            .unwrap()
    }

    #[test]
    fn below_threshold_produces_nothing() {
        let mut machine = AnomalyMachine::new(config());
        let outcome = machine
            .accumulate(ElementType::Fire, 40.0, &attacker(), Tick(1), None)
            .unwrap();
        assert!(outcome.is_none());
        assert_eq!(machine.bar(ElementType::Fire).accumulation, 40.0);
        assert_eq!(machine.bar(ElementType::Fire).state(Tick(1)), AnomalyState::Idle);
    }

    #[test]
    fn first_activation_takes_the_slot_and_resets_the_bar() {
        let mut machine = AnomalyMachine::new(config());
        let outcome = fill(&mut machine, ElementType::Fire, 10).unwrap();

        let AnomalyOutcome::Activated(activation) = outcome else {
            panic!("expected plain activation");
        };
        assert_eq!(activation.element, ElementType::Fire);
        assert!(!activation.refreshed);
        assert_eq!(activation.snapshot.attack(), 2000.0);

        let bar = machine.bar(ElementType::Fire);
        assert_eq!(bar.accumulation, 0.0);
        assert!(bar.snapshot.is_empty());
        assert_eq!(bar.last_activation, Some(Tick(10)));
        assert_eq!(machine.active_element().unwrap(), Some(ElementType::Fire));
    }

    #[test]
    fn same_element_refreshes_without_disorder() {
        let mut machine = AnomalyMachine::new(config());
        fill(&mut machine, ElementType::Electric, 0);
        let outcome = fill(&mut machine, ElementType::Electric, 40).unwrap();

        assert!(outcome.disorder().is_none());
        assert!(outcome.activation().refreshed);
        assert_eq!(machine.active_element().unwrap(), Some(ElementType::Electric));
    }

    #[test]
    fn cooldown_blocks_resolution() {
        let mut machine = AnomalyMachine::new(config());
        fill(&mut machine, ElementType::Ether, 0);
        assert!(fill(&mut machine, ElementType::Ether, 10).is_none());
        // The full bar resolves once the gate re-opens.
        let outcome = machine
            .accumulate(ElementType::Ether, 1.0, &attacker(), Tick(30), None)
            .unwrap();
        assert!(outcome.is_some());
    }

    #[test]
    fn cross_element_yields_exactly_one_disorder_naming_the_retiring_element() {
        let mut machine = AnomalyMachine::new(config());
        fill(&mut machine, ElementType::Fire, 0);
        let outcome = fill(&mut machine, ElementType::Physical, 100).unwrap();

        let AnomalyOutcome::Disordered {
            disorder,
            activation,
        } = outcome
        else {
            panic!("expected disorder");
        };
        assert_eq!(disorder.retiring, ElementType::Fire);
        assert_eq!(disorder.activating, ElementType::Physical);
        assert_eq!(disorder.remaining_ticks, 500);
        assert_eq!(disorder.snapshot.attack(), 2000.0);
        assert_eq!(activation.element, ElementType::Physical);

        assert!(!machine.bar(ElementType::Fire).active);
        assert_eq!(machine.active_set(), ActiveElements::PHYSICAL);
        // The retiring bar's cooldown is untouched by the disorder.
        assert_eq!(machine.bar(ElementType::Fire).last_activation, Some(Tick(0)));
    }

    #[test]
    fn ice_and_frost_share_the_active_slot() {
        let mut machine = AnomalyMachine::new(config());
        fill(&mut machine, ElementType::Ice, 0);
        let outcome = fill(&mut machine, ElementType::Frost, 5).unwrap();

        assert!(outcome.disorder().is_none());
        assert!(outcome.activation().refreshed);
        assert_eq!(machine.active_set(), ActiveElements::ICE_SLOT);
        assert_eq!(machine.active_element().unwrap(), Some(ElementType::Frost));

        // Leaving the slot retires both codes with a single disorder.
        let outcome = fill(&mut machine, ElementType::Fire, 10).unwrap();
        assert_eq!(outcome.disorder().map(|d| d.retiring), Some(ElementType::Frost));
        assert_eq!(machine.active_set(), ActiveElements::FIRE);
    }

    #[test]
    fn at_most_one_slot_active_across_a_sequence() {
        let mut machine = AnomalyMachine::new(AnomalyConfig {
            cooldown_ticks: 0,
            ..config()
        });
        let sequence = [
            ElementType::Fire,
            ElementType::Ice,
            ElementType::Frost,
            ElementType::Ether,
            ElementType::Ether,
            ElementType::AuricInk,
            ElementType::Physical,
            ElementType::Electric,
        ];
        let mut disorders = 0;
        for (tick, element) in sequence.into_iter().enumerate() {
            let previous = machine.active_element().unwrap();
            let outcome = fill(&mut machine, element, tick as u64).unwrap();
            assert!(machine.active_set().slot_count() <= 1);
            if let Some(disorder) = outcome.disorder() {
                disorders += 1;
                assert_eq!(Some(disorder.retiring), previous);
            }
        }
        assert_eq!(disorders, 5);
    }

    #[test]
    fn two_active_slots_is_an_invariant_violation() {
        let mut machine = AnomalyMachine::new(config());
        machine.bars[ElementType::Fire.index()].active = true;
        machine.bars[ElementType::Electric.index()].active = true;

        let err = machine
            .accumulate(ElementType::Ether, 100.0, &attacker(), Tick(0), None)
            .unwrap_err();
        assert!(matches!(err, AnomalyError::MultipleActive { .. }));
        assert_eq!(err.severity(), ErrorSeverity::Fatal);
    }

    #[test]
    fn polarity_disorder_keeps_the_active_element() {
        let mut machine = AnomalyMachine::new(config());
        assert!(machine.polarity_disorder(0.15, Tick(0), None).unwrap().is_none());

        fill(&mut machine, ElementType::Ether, 0);
        let record = machine
            .polarity_disorder(0.15, Tick(200), None)
            .unwrap()
            .unwrap();
        assert_eq!(record.element, ElementType::Ether);
        assert_eq!(record.remaining_ticks, 400);
        assert_eq!(machine.active_element().unwrap(), Some(ElementType::Ether));
    }

    #[test]
    fn active_anomaly_expires() {
        let mut machine = AnomalyMachine::new(config());
        fill(&mut machine, ElementType::Fire, 0);
        assert!(machine.expire_due(Tick(599)).is_empty());
        assert_eq!(machine.expire_due(Tick(600)), vec![ElementType::Fire]);
        assert_eq!(machine.active_element().unwrap(), None);
    }
}
