use serde::{Deserialize, Serialize};

use super::{Event, EventKind};
use crate::types::Tick;

/// An [`Event`] together with its scheduling metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub event: Event,
    /// `None` means "due immediately".
    #[serde(default)]
    pub execute_tick: Option<Tick>,
    /// Higher values settle first among due events.
    #[serde(default)]
    pub priority: i32,
}

impl ScheduledEvent {
    pub fn now(event: Event) -> Self {
        Self {
            event,
            execute_tick: None,
            priority: 0,
        }
    }

    pub fn at(event: Event, tick: Tick) -> Self {
        Self {
            event,
            execute_tick: Some(tick),
            priority: 0,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn kind(&self) -> EventKind {
        self.event.kind()
    }

    pub fn is_due(&self, tick: Tick) -> bool {
        self.execute_tick.is_none_or(|at| at <= tick)
    }
}

impl From<Event> for ScheduledEvent {
    fn from(event: Event) -> Self {
        Self::now(event)
    }
}
