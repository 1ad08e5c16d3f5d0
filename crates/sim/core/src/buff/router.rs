use std::collections::BTreeMap;

use tracing::trace;

use super::BuffRegistry;
use crate::types::BuffId;

/// Cached event type → candidate buff ids.
///
/// The cache is rebuilt wholesale whenever the registry's generation moves.
#[derive(Clone, Debug, Default)]
pub struct EventRouter {
    index: BTreeMap<String, Vec<BuffId>>,
    built_for: Option<u64>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn candidates(&mut self, registry: &BuffRegistry, event_type: &str) -> &[BuffId] {
        if self.built_for != Some(registry.generation()) {
            self.index = registry.event_index();
            self.built_for = Some(registry.generation());
            trace!(target: "sim::buff", events = self.index.len(), "event index rebuilt");
        }
        self.index
            .get(event_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn invalidate(&mut self) {
        self.built_for = None;
    }
}
