use std::collections::HashMap;

use tracing::debug;

use super::{EventHandler, ScheduleError};
use crate::event::{Event, EventKind};

/// Maps event kinds to their handler.
///
/// Resolution walks the registered handlers once per kind and memoizes the
/// result until [`reset_cache`](Self::reset_cache) is called.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: Vec<Box<dyn EventHandler>>,
    cache: HashMap<EventKind, usize>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails if a handler already declares the same kind.
    pub fn register(&mut self, handler: Box<dyn EventHandler>) -> Result<(), ScheduleError> {
        let kind = handler.kind();
        if self.handlers.iter().any(|existing| existing.kind() == kind) {
            return Err(ScheduleError::DuplicateHandler(kind));
        }
        debug!(target: "sim::scheduler", kind = %kind, "handler registered");
        self.handlers.push(handler);
        Ok(())
    }

    pub fn resolve(&mut self, event: &Event) -> Result<&dyn EventHandler, ScheduleError> {
        let kind = event.kind();
        let index = match self.cache.get(&kind) {
            Some(&index) => index,
            None => {
                let index = self
                    .handlers
                    .iter()
                    .position(|handler| handler.can_handle(event))
                    .ok_or(ScheduleError::UnhandledEvent(kind))?;
                self.cache.insert(kind, index);
                index
            }
        };
        Ok(self.handlers[index].as_ref())
    }

    pub fn is_cached(&self, kind: EventKind) -> bool {
        self.cache.contains_key(&kind)
    }

    pub fn reset_cache(&mut self) {
        self.cache.clear();
    }

    pub fn kinds(&self) -> impl Iterator<Item = EventKind> + '_ {
        self.handlers.iter().map(|handler| handler.kind())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("kinds", &self.kinds().collect::<Vec<_>>())
            .field("cached", &self.cache.len())
            .finish()
    }
}
