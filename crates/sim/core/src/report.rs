//! One-way reporting of settled results.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::anomaly::ElementType;
use crate::damage::DamageResult;
use crate::enemy::EnemyStatus;
use crate::event::EventKind;
use crate::types::{OwnerId, Tick};

/// A settled damage (or stun) result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub tick: Tick,
    pub kind: EventKind,
    pub source: Option<OwnerId>,
    /// Skill id or anomaly name.
    pub label: String,
    pub element: ElementType,
    pub expected: f64,
    pub critical: f64,
    pub stun: f64,
    pub buildup: f64,
    pub status: EnemyStatus,
}

impl ReportRecord {
    pub fn new(tick: Tick, kind: EventKind, element: ElementType, damage: DamageResult) -> Self {
        Self {
            tick,
            kind,
            source: None,
            label: String::new(),
            element,
            expected: damage.expected,
            critical: damage.critical,
            stun: 0.0,
            buildup: 0.0,
            status: EnemyStatus::default(),
        }
    }

    pub fn with_source(mut self, source: Option<OwnerId>) -> Self {
        self.source = source;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_stun(mut self, stun: f64, buildup: f64) -> Self {
        self.stun = stun;
        self.buildup = buildup;
        self
    }
}

/// Receives every record; the engine never reads anything back.
pub trait ReportSink: Send {
    fn record(&mut self, record: ReportRecord);

    /// Called by the driver when a run ends.
    fn flush(&mut self) {}
}

/// Collects records in memory. Clones share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<ReportRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ReportRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReportSink for MemorySink {
    fn record(&mut self, record: ReportRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }
}

/// Drops every record.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn record(&mut self, _record: ReportRecord) {}
}
