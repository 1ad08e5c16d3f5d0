//! Ordered pending-event collection.

use crate::event::ScheduledEvent;
use crate::types::Tick;

#[derive(Clone, Debug)]
struct Entry {
    seq: u64,
    event: ScheduledEvent,
}

impl Entry {
    /// Buff settlements first, then higher priority, then insertion order.
    fn key(&self) -> (bool, std::cmp::Reverse<i32>, u64) {
        (
            !self.event.kind().is_buff_settlement(),
            std::cmp::Reverse(self.event.priority),
            self.seq,
        )
    }
}

/// Pending events kept in settle order.
///
/// Insertion uses a binary position search, so the order is fully
/// determined by (settlement class, priority, insertion sequence).
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    entries: Vec<Entry>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: ScheduledEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.insert(Entry { seq, event });
    }

    fn insert(&mut self, entry: Entry) {
        let key = entry.key();
        let index = self.entries.partition_point(|existing| existing.key() <= key);
        self.entries.insert(index, entry);
    }

    /// Removes and returns every event due at `tick`, in settle order.
    pub fn take_due(&mut self, tick: Tick) -> Vec<ScheduledEvent> {
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|entry| entry.event.is_due(tick));
        self.entries = pending;
        due.into_iter().map(|entry| entry.event).collect()
    }

    pub fn has_due(&self, tick: Tick) -> bool {
        self.entries.iter().any(|entry| entry.event.is_due(tick))
    }

    pub fn due_count(&self, tick: Tick) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.event.is_due(tick))
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledEvent> {
        self.entries.iter().map(|entry| &entry.event)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
