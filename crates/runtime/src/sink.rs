//! Report sinks that leave the process: JSON lines and aggregate totals.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use sim_core::{ElementType, EventKind, ReportRecord, ReportSink};

use crate::error::{Result, RuntimeError};

/// Writes one JSON object per record.
///
/// A failed write is logged once and later records are dropped; the engine
/// never depends on the sink's outcome.
#[derive(Debug)]
pub struct JsonlReportSink {
    path: PathBuf,
    writer: BufWriter<File>,
    written: u64,
    failed: bool,
}

impl JsonlReportSink {
    /// Creates (truncating) the output file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| RuntimeError::io(parent, e))?;
        }
        let file = File::create(&path).map_err(|e| RuntimeError::io(&path, e))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            written: 0,
            failed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    fn write_line(&mut self, record: &ReportRecord) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")
    }

    fn fail(&mut self, err: std::io::Error) {
        self.failed = true;
        tracing::error!(
            target: "runtime::sink",
            path = %self.path.display(),
            error = %err,
            "report write failed, dropping further records"
        );
    }
}

impl ReportSink for JsonlReportSink {
    fn record(&mut self, record: ReportRecord) {
        if self.failed {
            return;
        }
        match self.write_line(&record) {
            Ok(()) => self.written += 1,
            Err(err) => self.fail(err),
        }
    }

    fn flush(&mut self) {
        if self.failed {
            return;
        }
        if let Err(err) = self.writer.flush() {
            self.fail(err);
        }
    }
}

/// Aggregated damage of one run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DamageTotals {
    pub records: usize,
    pub expected: f64,
    pub critical: f64,
    pub by_element: BTreeMap<ElementType, f64>,
    pub anomalies: usize,
    pub disorders: usize,
    pub dot_ticks: usize,
    pub stun: f64,
}

impl DamageTotals {
    fn add(&mut self, record: &ReportRecord) {
        self.records += 1;
        self.expected += record.expected;
        self.critical += record.critical;
        self.stun += record.stun;
        *self.by_element.entry(record.element).or_insert(0.0) += record.expected;
        match record.kind {
            EventKind::AnomalyActivation => self.anomalies += 1,
            EventKind::Disorder | EventKind::PolarityDisorder => self.disorders += 1,
            EventKind::DotTick => self.dot_ticks += 1,
            _ => {}
        }
    }
}

/// Folds records into [`DamageTotals`]. Clones share the same totals.
#[derive(Clone, Debug, Default)]
pub struct TotalsSink {
    totals: Arc<Mutex<DamageTotals>>,
}

impl TotalsSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn totals(&self) -> DamageTotals {
        self.totals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ReportSink for TotalsSink {
    fn record(&mut self, record: ReportRecord) {
        self.totals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .add(&record);
    }
}

#[cfg(test)]
mod tests {
    use sim_core::{DamageResult, Tick};

    use super::*;

    fn record(kind: EventKind, element: ElementType, expected: f64) -> ReportRecord {
        ReportRecord::new(
            Tick(1),
            kind,
            element,
            DamageResult {
                expected,
                critical: expected * 2.0,
            },
        )
    }

    #[test]
    fn jsonl_writes_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/report.jsonl");
        let mut sink = JsonlReportSink::create(&path).unwrap();
        sink.record(record(EventKind::SkillHit, ElementType::Fire, 10.0));
        sink.record(record(EventKind::AnomalyActivation, ElementType::Fire, 5.0));
        sink.flush();
        assert_eq!(sink.written(), 2);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: ReportRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed.kind, EventKind::AnomalyActivation);
        assert_eq!(parsed.expected, 5.0);
    }

    #[test]
    fn totals_are_shared_between_clones() {
        let sink = TotalsSink::new();
        let mut writer = sink.clone();
        writer.record(record(EventKind::SkillHit, ElementType::Ice, 10.0));
        writer.record(record(EventKind::AnomalyActivation, ElementType::Ice, 4.0));
        writer.record(record(EventKind::Disorder, ElementType::Fire, 6.0));

        let totals = sink.totals();
        assert_eq!(totals.records, 3);
        assert_eq!(totals.expected, 20.0);
        assert_eq!(totals.critical, 40.0);
        assert_eq!(totals.by_element[&ElementType::Ice], 14.0);
        assert_eq!(totals.anomalies, 1);
        assert_eq!(totals.disorders, 1);
    }
}
