//! Per-tick event scheduler.
//!
//! `settle(tick)` runs in passes. Each pass takes every event due at `tick`
//! (buff settlements first, then by priority, then insertion order), runs
//! its handler and queues whatever the handler emitted. Passes repeat until
//! nothing due remains, bounded by `max_cascade_depth`.
mod error;
mod handler;
mod queue;
mod registry;

use tracing::{debug, error};

pub use error::{HandlerError, ScheduleError};
pub use handler::{EventHandler, TickContext};
pub use queue::EventQueue;
pub use registry::HandlerRegistry;

use crate::config::SimConfig;
use crate::event::ScheduledEvent;
use crate::types::Tick;
use crate::world::SimWorld;

/// Counters of one `settle` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettleStats {
    pub processed: usize,
    pub passes: usize,
}

#[derive(Debug)]
pub struct EventScheduler {
    queue: EventQueue,
    handlers: HandlerRegistry,
    max_cascade_depth: usize,
    processed: u64,
}

impl EventScheduler {
    pub fn new(handlers: HandlerRegistry, config: &SimConfig) -> Self {
        Self {
            queue: EventQueue::new(),
            handlers,
            max_cascade_depth: config.max_cascade_depth,
            processed: 0,
        }
    }

    /// Scheduler with one handler per event kind.
    pub fn with_default_handlers(config: &SimConfig) -> Result<Self, ScheduleError> {
        Ok(Self::new(crate::handlers::default_handlers()?, config))
    }

    pub fn schedule(&mut self, event: impl Into<ScheduledEvent>) {
        self.queue.push(event.into());
    }

    pub fn schedule_all(&mut self, events: impl IntoIterator<Item = ScheduledEvent>) {
        for event in events {
            self.queue.push(event);
        }
    }

    /// Processes every event due at `tick`, including the ones produced
    /// while settling, and never one scheduled after `tick`.
    ///
    /// The first handler failure aborts the call; the run should then be
    /// discarded since the rest of the batch was not processed.
    pub fn settle(&mut self, tick: Tick, world: &mut SimWorld) -> Result<SettleStats, ScheduleError> {
        let mut stats = SettleStats::default();

        while self.queue.has_due(tick) {
            if stats.passes >= self.max_cascade_depth {
                let pending = self.queue.due_count(tick);
                error!(
                    target: "sim::scheduler",
                    tick = tick.0,
                    passes = stats.passes,
                    pending,
                    "event cascade did not converge"
                );
                return Err(ScheduleError::CascadeTooDeep {
                    tick,
                    passes: stats.passes,
                    pending,
                });
            }
            stats.passes += 1;

            let batch = self.queue.take_due(tick);
            debug!(
                target: "sim::scheduler",
                tick = tick.0,
                pass = stats.passes,
                events = batch.len(),
                "settling batch"
            );

            for scheduled in batch {
                let kind = scheduled.kind();
                let handler = self.handlers.resolve(&scheduled.event).inspect_err(|e| {
                    error!(target: "sim::scheduler", tick = tick.0, %kind, error = %e, "no handler");
                })?;

                let mut ctx = TickContext::new(tick, world);
                if let Err(source) = handler.handle(&scheduled.event, &mut ctx) {
                    error!(
                        target: "sim::scheduler",
                        tick = tick.0,
                        %kind,
                        error = %source,
                        "handler failed"
                    );
                    return Err(ScheduleError::HandlerFailed { kind, tick, source });
                }
                for emitted in ctx.into_emitted() {
                    self.queue.push(emitted);
                }

                stats.processed += 1;
                self.processed += 1;
            }
        }

        Ok(stats)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn pending_events(&self) -> impl Iterator<Item = &ScheduledEvent> {
        self.queue.iter()
    }

    pub fn has_due(&self, tick: Tick) -> bool {
        self.queue.has_due(tick)
    }

    pub fn max_cascade_depth(&self) -> usize {
        self.max_cascade_depth
    }

    /// Events processed over the scheduler's lifetime.
    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    pub fn handlers_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.handlers
    }
}
