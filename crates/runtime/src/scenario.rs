//! Scenario files: participants, buff definitions and the upstream timeline.
//!
//! A scenario is everything the driver would otherwise receive from the
//! upstream skill/action resolution. Keeping it as data lets one scenario
//! seed many independent runs of a sweep.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sim_core::{
    BasicParticipant, BuffDefinition, BuffEngine, BuffRegistry, Enemy, Event, Roster,
    ScheduledEvent, SimConfig, SimWorld, Tick,
};

use crate::driver::Timeline;
use crate::error::{Result, RuntimeError};

/// One upstream event handed to the scheduler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Tick at which the driver feeds the event in.
    pub tick: Tick,
    pub event: Event,
    #[serde(default)]
    pub priority: i32,
    /// Ticks between feeding and execution; delayed assists and actions use
    /// a non-zero delay.
    #[serde(default)]
    pub delay: u64,
}

impl TimelineEntry {
    pub fn new(tick: Tick, event: Event) -> Self {
        Self {
            tick,
            event,
            priority: 0,
            delay: 0,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_delay(mut self, delay: u64) -> Self {
        self.delay = delay;
        self
    }

    fn scheduled(&self) -> ScheduledEvent {
        ScheduledEvent::at(self.event.clone(), self.tick + self.delay).with_priority(self.priority)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub participants: Vec<BasicParticipant>,
    pub definitions: Vec<BuffDefinition>,
    pub enemy: Enemy,
    pub timeline: Vec<TimelineEntry>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| RuntimeError::io(path, e))?;
        let scenario: Scenario = ron::from_str(&content).map_err(|e| RuntimeError::Ron {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        tracing::info!(
            target: "runtime::scenario",
            path = %path.display(),
            participants = scenario.participants.len(),
            definitions = scenario.definitions.len(),
            events = scenario.timeline.len(),
            "scenario loaded"
        );
        Ok(scenario)
    }

    pub fn with_participant(mut self, participant: BasicParticipant) -> Self {
        self.participants.push(participant);
        self
    }

    pub fn with_definition(mut self, definition: BuffDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn with_entry(mut self, entry: TimelineEntry) -> Self {
        self.timeline.push(entry);
        self
    }

    /// Registers the scenario's definitions (all-or-nothing) and builds a
    /// fresh world around `registry`.
    pub fn build_world(&self, config: &SimConfig, mut registry: BuffRegistry) -> Result<SimWorld> {
        registry.register_all(self.definitions.iter().cloned())?;

        let roster = self
            .participants
            .iter()
            .cloned()
            .fold(Roster::new(), |roster, participant| roster.with(participant));

        Ok(SimWorld::new(config.clone(), BuffEngine::new(registry))
            .with_roster(roster)
            .with_enemy(self.enemy.clone()))
    }

    pub fn timeline(&self) -> Timeline {
        let mut timeline = Timeline::new();
        for entry in &self.timeline {
            timeline.push(entry.tick, entry.scheduled());
        }
        timeline
    }
}
