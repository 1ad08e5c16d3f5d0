//! Run configuration loaded from RON.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sim_core::SimConfig;

use crate::error::{Result, RuntimeError};

/// Everything one simulation run needs besides its scenario.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub sim: SimConfig,
    /// Ticks the driver advances before the run ends.
    pub total_ticks: u64,
    pub log: LogConfig,
    /// JSON-lines report output; reports are kept in memory when unset.
    pub report_path: Option<PathBuf>,
    /// Directory of the file-backed definition store.
    pub definitions_path: Option<PathBuf>,
}

impl RuntimeConfig {
    pub const DEFAULT_TOTAL_TICKS: u64 = 3600;

    /// Loads a RON config file.
    ///
    /// ```ron
    /// (
    ///     total_ticks: 1200,
    ///     sim: (max_cascade_depth: 32),
    ///     log: (filter: "sim=debug,runtime=info"),
    /// )
    /// ```
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| RuntimeError::io(path, e))?;
        ron::from_str(&content).map_err(|e| RuntimeError::Ron {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            sim: SimConfig::default(),
            total_ticks: Self::DEFAULT_TOTAL_TICKS,
            log: LogConfig::default(),
            report_path: None,
            definitions_path: None,
        }
    }
}

/// Tracing subscriber settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
    /// Optional log file, written through a non-blocking appender.
    pub file: Option<PathBuf>,
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            file: None,
            ansi: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_ron_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.ron");
        fs::write(
            &path,
            r#"(total_ticks: 120, sim: (max_cascade_depth: 16), log: (filter: "debug"))"#,
        )
        .unwrap();

        let config = RuntimeConfig::load_from_file(&path).unwrap();
        assert_eq!(config.total_ticks, 120);
        assert_eq!(config.sim.max_cascade_depth, 16);
        assert_eq!(config.sim.anomaly, SimConfig::default().anomaly);
        assert_eq!(config.log.filter, "debug");
        assert!(config.log.ansi);
        assert_eq!(config.report_path, None);
    }

    #[test]
    fn missing_file_and_bad_ron_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = RuntimeConfig::load_from_file(&dir.path().join("nope.ron")).unwrap_err();
        assert!(matches!(missing, RuntimeError::Io { .. }));

        let path = dir.path().join("bad.ron");
        fs::write(&path, "(total_ticks: \"many\")").unwrap();
        assert!(matches!(
            RuntimeConfig::load_from_file(&path).unwrap_err(),
            RuntimeError::Ron { .. }
        ));
    }
}
