//! Lingering anomaly effects on the target.
//!
//! An activation may leave a [`Dot`] behind:
//!
//! ```text
//!   burn, corruption, auric ink ──► Periodic: settles every interval until it runs out
//!   shock ────────────────────────► OnHit: settles on landed hits, gated by a cooldown
//!   ice, frost ───────────────────► Freeze: holds the shatter until the freeze ends
//!   assault ──────────────────────► nothing
//! ```
//!
//! A new dot replaces the one of the same element. A new freeze while the
//! target is still frozen releases the old shatter at once. A disorder
//! removes the retiring element's dot and every freeze, releasing their
//! shatters.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AnomalyActivation, Disorder, ElementType};
use crate::config::AnomalyConfig;
use crate::types::Tick;

/// How a dot settles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DotRule {
    Periodic { interval: u64 },
    OnHit { cooldown: u64 },
    Freeze,
}

/// One lingering effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dot {
    /// Identifies this dot in scheduled [`DotTick`](crate::event::DotTickEvent)s.
    pub serial: u64,
    pub rule: DotRule,
    pub activation: AnomalyActivation,
    pub started: Tick,
    /// Last tick at which the dot may still settle.
    pub until: Tick,
    pub last_effect: Option<Tick>,
    pub effect_times: u32,
}

impl Dot {
    pub fn element(&self) -> ElementType {
        self.activation.element
    }

    pub fn is_freeze(&self) -> bool {
        self.rule == DotRule::Freeze
    }
}

/// What starting a dot asks the caller to do.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DotStart {
    /// Shatter of a previous freeze, to settle now.
    pub released: Option<AnomalyActivation>,
    /// The activation's own damage waits for the freeze to end.
    pub deferred: bool,
    /// First scheduled settlement of the new dot.
    pub next: Option<(u64, Tick)>,
}

/// One settlement of a dot.
#[derive(Clone, Debug, PartialEq)]
pub enum DotEffect {
    /// Periodic or on-hit damage; `next` is the following periodic tick.
    Tick {
        activation: AnomalyActivation,
        next: Option<Tick>,
    },
    /// The freeze ended and its shatter settles.
    Shatter(AnomalyActivation),
}

/// Dots currently on the target.
#[derive(Clone, Debug)]
pub struct DotTracker {
    dots: Vec<Dot>,
    next_serial: u64,
    config: AnomalyConfig,
}

impl DotTracker {
    pub fn new(config: AnomalyConfig) -> Self {
        Self {
            dots: Vec::new(),
            next_serial: 0,
            config,
        }
    }

    pub fn rule_for(&self, element: ElementType) -> Option<DotRule> {
        match element {
            ElementType::Physical => None,
            ElementType::Fire | ElementType::Ether | ElementType::AuricInk => {
                Some(DotRule::Periodic {
                    interval: self.config.dot_interval_ticks.max(1),
                })
            }
            ElementType::Electric => Some(DotRule::OnHit {
                cooldown: self.config.shock_cooldown_ticks,
            }),
            ElementType::Ice | ElementType::Frost => Some(DotRule::Freeze),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dot> {
        self.dots.iter()
    }

    pub fn get(&self, serial: u64) -> Option<&Dot> {
        self.dots.iter().find(|dot| dot.serial == serial)
    }

    pub fn len(&self) -> usize {
        self.dots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }

    pub fn is_frozen(&self) -> bool {
        self.dots.iter().any(Dot::is_freeze)
    }

    /// Starts the dot left behind by `activation`.
    pub fn start(&mut self, activation: &AnomalyActivation, now: Tick) -> DotStart {
        let element = activation.element;
        let Some(rule) = self.rule_for(element) else {
            return DotStart::default();
        };

        let mut start = DotStart::default();
        let until = match rule {
            DotRule::Freeze => {
                start.released = self.take_freeze().map(|old| old.activation);
                start.deferred = true;
                now + self.config.freeze_ticks
            }
            DotRule::Periodic { .. } | DotRule::OnHit { .. } => {
                if let Some(index) = self
                    .dots
                    .iter()
                    .position(|dot| !dot.is_freeze() && dot.element() == element)
                {
                    let replaced = self.dots.remove(index);
                    debug!(
                        target: "sim::anomaly",
                        tick = now.0,
                        %element,
                        effects = replaced.effect_times,
                        "dot replaced"
                    );
                }
                now + self.config.duration_for(element)
            }
        };

        let serial = self.next_serial;
        self.next_serial += 1;
        start.next = match rule {
            DotRule::Freeze => Some((serial, until)),
            DotRule::Periodic { interval } => Some((serial, now + interval)).filter(|(_, at)| *at <= until),
            DotRule::OnHit { .. } => None,
        };
        self.dots.push(Dot {
            serial,
            rule,
            activation: activation.clone(),
            started: now,
            until,
            last_effect: None,
            effect_times: 0,
        });
        debug!(target: "sim::anomaly", tick = now.0, %element, serial, until = until.0, "dot started");
        start
    }

    fn take_freeze(&mut self) -> Option<Dot> {
        let index = self.dots.iter().position(Dot::is_freeze)?;
        Some(self.dots.remove(index))
    }

    /// Settles the dot `serial` at `now`.
    ///
    /// Returns `None` when the dot was replaced, removed or ran out; the
    /// scheduled tick is then stale and settles nothing.
    pub fn settle(&mut self, serial: u64, now: Tick) -> Option<DotEffect> {
        let index = self.dots.iter().position(|dot| dot.serial == serial)?;
        if self.dots[index].until < now {
            self.dots.remove(index);
            return None;
        }

        let dot = &mut self.dots[index];
        match dot.rule {
            DotRule::Freeze => {
                let dot = self.dots.remove(index);
                debug!(target: "sim::anomaly", tick = now.0, element = %dot.element(), "freeze ended");
                Some(DotEffect::Shatter(dot.activation))
            }
            DotRule::Periodic { interval } => {
                dot.last_effect = Some(now);
                dot.effect_times += 1;
                let next = Some(now + interval).filter(|at| *at <= dot.until);
                let activation = dot.activation.clone();
                if next.is_none() {
                    self.dots.remove(index);
                }
                Some(DotEffect::Tick { activation, next })
            }
            // The cooldown was consumed when the hit claimed this settlement.
            DotRule::OnHit { .. } => Some(DotEffect::Tick {
                activation: dot.activation.clone(),
                next: None,
            }),
        }
    }

    /// Claims an on-hit settlement from every ready on-hit dot.
    ///
    /// Returns the claimed serials with their elements; each one should be
    /// settled through [`settle`](Self::settle) within the same tick.
    pub fn on_hit(&mut self, now: Tick) -> Vec<(u64, ElementType)> {
        let mut claimed = Vec::new();
        for dot in &mut self.dots {
            let DotRule::OnHit { cooldown } = dot.rule else {
                continue;
            };
            if dot.until < now {
                continue;
            }
            if dot.last_effect.is_some_and(|last| now.since(last) < cooldown) {
                continue;
            }
            dot.last_effect = Some(now);
            dot.effect_times += 1;
            claimed.push((dot.serial, dot.element()));
        }
        claimed
    }

    /// Removes the dots a disorder ends and returns the shatters it releases.
    pub fn clear_for_disorder(&mut self, disorder: &Disorder) -> Vec<AnomalyActivation> {
        let mut released = Vec::new();
        self.dots.retain(|dot| {
            if dot.is_freeze() {
                released.push(dot.activation.clone());
                return false;
            }
            !dot.element().shares_slot_with(disorder.retiring)
        });
        if !released.is_empty() {
            debug!(
                target: "sim::anomaly",
                tick = disorder.tick.0,
                released = released.len(),
                "freeze broken by disorder"
            );
        }
        released
    }

    /// Drops non-freeze dots that ran out before `now`.
    pub fn purge_expired(&mut self, now: Tick) -> usize {
        let before = self.dots.len();
        self.dots.retain(|dot| dot.is_freeze() || dot.until >= now);
        before - self.dots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::AnomalySnapshot;

    fn config() -> AnomalyConfig {
        AnomalyConfig {
            active_duration_ticks: 100,
            dot_interval_ticks: 30,
            shock_cooldown_ticks: 60,
            freeze_ticks: 40,
            ..AnomalyConfig::default()
        }
    }

    fn activation(element: ElementType, tick: u64) -> AnomalyActivation {
        AnomalyActivation {
            element,
            snapshot: AnomalySnapshot::default(),
            tick: Tick(tick),
            refreshed: false,
            source: Some("hero".into()),
        }
    }

    #[test]
    fn periodic_dot_ticks_until_it_runs_out() {
        let mut dots = DotTracker::new(config());
        let start = dots.start(&activation(ElementType::Fire, 0), Tick(0));
        assert!(!start.deferred);
        let (serial, mut at) = start.next.unwrap();
        assert_eq!(at, Tick(30));

        let mut ticks = Vec::new();
        loop {
            match dots.settle(serial, at) {
                Some(DotEffect::Tick { next, .. }) => {
                    ticks.push(at);
                    match next {
                        Some(next) => at = next,
                        None => break,
                    }
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(ticks, [Tick(30), Tick(60), Tick(90)]);
        assert!(dots.is_empty());
    }

    #[test]
    fn replaced_dot_leaves_stale_ticks() {
        let mut dots = DotTracker::new(config());
        let (old, _) = dots.start(&activation(ElementType::Ether, 0), Tick(0)).next.unwrap();
        let (new, _) = dots.start(&activation(ElementType::Ether, 10), Tick(10)).next.unwrap();

        assert_eq!(dots.len(), 1);
        assert!(dots.settle(old, Tick(30)).is_none());
        assert!(dots.settle(new, Tick(40)).is_some());
    }

    #[test]
    fn shock_settles_on_hits_behind_a_cooldown() {
        let mut dots = DotTracker::new(config());
        let start = dots.start(&activation(ElementType::Electric, 0), Tick(0));
        assert_eq!(start.next, None);

        assert_eq!(dots.on_hit(Tick(5)).len(), 1);
        assert!(dots.on_hit(Tick(30)).is_empty());
        let claimed = dots.on_hit(Tick(65));
        assert_eq!(claimed, [(0, ElementType::Electric)]);
        assert!(matches!(dots.settle(0, Tick(65)), Some(DotEffect::Tick { next: None, .. })));
        // Past its duration the shock no longer answers hits.
        assert!(dots.on_hit(Tick(200)).is_empty());
        assert_eq!(dots.purge_expired(Tick(200)), 1);
    }

    #[test]
    fn freeze_defers_the_shatter() {
        let mut dots = DotTracker::new(config());
        let start = dots.start(&activation(ElementType::Ice, 0), Tick(0));
        assert!(start.deferred);
        assert!(start.released.is_none());
        assert!(dots.is_frozen());

        let (serial, at) = start.next.unwrap();
        assert_eq!(at, Tick(40));
        let Some(DotEffect::Shatter(shatter)) = dots.settle(serial, at) else {
            panic!("expected a shatter");
        };
        assert_eq!(shatter.element, ElementType::Ice);
        assert!(!dots.is_frozen());
    }

    #[test]
    fn refreezing_releases_the_old_shatter() {
        let mut dots = DotTracker::new(config());
        let (first, _) = dots.start(&activation(ElementType::Ice, 0), Tick(0)).next.unwrap();
        let start = dots.start(&activation(ElementType::Frost, 10), Tick(10));

        assert_eq!(start.released.map(|a| a.element), Some(ElementType::Ice));
        assert_eq!(dots.len(), 1);
        assert!(dots.settle(first, Tick(40)).is_none());
        assert!(dots.is_frozen());
    }

    #[test]
    fn disorder_clears_freeze_and_the_retiring_dot() {
        let mut dots = DotTracker::new(config());
        dots.start(&activation(ElementType::Fire, 0), Tick(0));
        dots.start(&activation(ElementType::Ice, 5), Tick(5));
        dots.start(&activation(ElementType::Ether, 6), Tick(6));

        let disorder = Disorder {
            retiring: ElementType::Fire,
            activating: ElementType::Physical,
            snapshot: AnomalySnapshot::default(),
            remaining_ticks: 50,
            tick: Tick(20),
            source: None,
        };
        let released = dots.clear_for_disorder(&disorder);
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].element, ElementType::Ice);
        let left: Vec<_> = dots.iter().map(Dot::element).collect();
        assert_eq!(left, [ElementType::Ether]);
    }

    #[test]
    fn assault_leaves_no_dot() {
        let mut dots = DotTracker::new(config());
        assert_eq!(dots.start(&activation(ElementType::Physical, 0), Tick(0)), DotStart::default());
        assert!(dots.is_empty());
    }
}