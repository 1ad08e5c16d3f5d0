//! Tick driver.
//!
//! Each tick the driver decays buffs, expires anomalies, feeds the upstream
//! events resolved for that tick and settles the scheduler. Cancellation is
//! only observed between ticks, never inside `settle`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use sim_core::{EventScheduler, ScheduledEvent, SettleStats, SimWorld, Tick};
use tracing::{debug, error, info};

use crate::error::Result;

/// Upstream events keyed by the tick they are fed in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Timeline {
    entries: BTreeMap<Tick, Vec<ScheduledEvent>>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tick: Tick, event: impl Into<ScheduledEvent>) {
        self.entries.entry(tick).or_default().push(event.into());
    }

    pub fn with(mut self, tick: Tick, event: impl Into<ScheduledEvent>) -> Self {
        self.push(tick, event);
        self
    }

    /// Removes and returns the events fed at `tick`, in insertion order.
    pub fn take(&mut self, tick: Tick) -> Vec<ScheduledEvent> {
        self.entries.remove(&tick).unwrap_or_default()
    }

    pub fn last_tick(&self) -> Option<Tick> {
        self.entries.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cooperative stop signal shared between a run and its controller.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Counters of a finished (or cancelled) run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Ticks fully settled.
    pub ticks: u64,
    pub processed: u64,
    pub purged_buffs: usize,
    pub expired_anomalies: usize,
    /// Events still queued for later ticks.
    pub pending: usize,
    pub cancelled: bool,
}

/// One simulation instance: its world, scheduler and upstream timeline.
#[derive(Debug)]
pub struct Simulation {
    world: SimWorld,
    scheduler: EventScheduler,
    timeline: Timeline,
    next_tick: Tick,
    summary: RunSummary,
}

impl Simulation {
    /// Builds a simulation with the default handler set, configured from
    /// the world's own [`SimConfig`](sim_core::SimConfig).
    pub fn new(world: SimWorld, timeline: Timeline) -> Result<Self> {
        let scheduler = EventScheduler::with_default_handlers(&world.config)?;
        Ok(Self::with_scheduler(world, scheduler, timeline))
    }

    pub fn with_scheduler(world: SimWorld, scheduler: EventScheduler, timeline: Timeline) -> Self {
        Self {
            world,
            scheduler,
            timeline,
            next_tick: Tick::ZERO,
            summary: RunSummary::default(),
        }
    }

    pub fn world(&self) -> &SimWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut SimWorld {
        &mut self.world
    }

    pub fn scheduler(&self) -> &EventScheduler {
        &self.scheduler
    }

    pub fn next_tick(&self) -> Tick {
        self.next_tick
    }

    pub fn into_world(self) -> SimWorld {
        self.world
    }

    /// Advances and settles exactly one tick.
    pub fn step(&mut self) -> Result<SettleStats> {
        let tick = self.next_tick;

        let upkeep = self.world.advance(tick);
        self.summary.purged_buffs += upkeep.purged_buffs;
        self.summary.expired_anomalies += upkeep.expired_anomalies.len();

        self.scheduler.schedule_all(self.timeline.take(tick));
        let stats = self.scheduler.settle(tick, &mut self.world)?;

        if stats.processed > 0 {
            debug!(
                target: "runtime::driver",
                tick = tick.0,
                processed = stats.processed,
                passes = stats.passes,
                "tick settled"
            );
        }
        self.summary.ticks += 1;
        self.next_tick = tick.next();
        Ok(stats)
    }

    /// Runs up to `ticks` ticks, stopping early when `cancel` is raised.
    ///
    /// Reports are flushed on every exit path. A failed tick ends the run;
    /// its partial results are not meant to be resumed.
    pub fn run(&mut self, ticks: u64, cancel: &CancelFlag) -> Result<RunSummary> {
        info!(
            target: "runtime::driver",
            start = self.next_tick.0,
            ticks,
            "run started"
        );

        for _ in 0..ticks {
            if cancel.is_cancelled() {
                self.summary.cancelled = true;
                info!(target: "runtime::driver", tick = self.next_tick.0, "run cancelled");
                break;
            }
            if let Err(err) = self.step() {
                self.world.flush_reports();
                error!(
                    target: "runtime::driver",
                    tick = self.next_tick.0,
                    error = %err,
                    "run aborted"
                );
                return Err(err);
            }
        }
        self.world.flush_reports();

        self.summary.processed = self.scheduler.processed();
        self.summary.pending = self.scheduler.pending();
        info!(
            target: "runtime::driver",
            ticks = self.summary.ticks,
            processed = self.summary.processed,
            pending = self.summary.pending,
            "run finished"
        );
        Ok(self.summary.clone())
    }
}
