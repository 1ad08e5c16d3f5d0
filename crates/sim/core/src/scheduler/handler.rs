use crate::event::{Event, EventKind, ScheduledEvent};
use crate::types::Tick;
use crate::world::SimWorld;

use super::HandlerError;

/// Mutable view handed to a handler for the duration of one event.
///
/// Events emitted here are queued by the scheduler once the handler returns.
pub struct TickContext<'a> {
    tick: Tick,
    pub world: &'a mut SimWorld,
    emitted: Vec<ScheduledEvent>,
}

impl<'a> TickContext<'a> {
    pub fn new(tick: Tick, world: &'a mut SimWorld) -> Self {
        Self {
            tick,
            world,
            emitted: Vec::new(),
        }
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn emit(&mut self, event: impl Into<ScheduledEvent>) {
        self.emitted.push(event.into());
    }

    pub fn into_emitted(self) -> Vec<ScheduledEvent> {
        self.emitted
    }
}

/// Strategy that settles one kind of event.
///
/// Handlers hold no tick-scoped state; everything they touch comes in
/// through the [`TickContext`].
pub trait EventHandler: Send {
    fn kind(&self) -> EventKind;

    fn can_handle(&self, event: &Event) -> bool {
        event.kind() == self.kind()
    }

    fn handle(&self, event: &Event, ctx: &mut TickContext<'_>) -> Result<(), HandlerError>;
}
