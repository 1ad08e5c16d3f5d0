//! Runtime orchestration for the tick-driven combat engine.
//!
//! This crate wires `sim-core` to the outside world: it loads configuration
//! and scenarios from RON, persists buff definitions on disk, writes reports,
//! drives ticks and fans independent runs out over tokio's blocking pool.
//!
//! Modules are organized by responsibility:
//! - [`driver`] advances ticks for one simulation
//! - [`sweep`] runs many simulations concurrently
//! - [`scenario`] and [`config`] load run inputs
//! - [`repository`] and [`sink`] provide I/O adapters for the core traits
//! - [`logging`] installs the tracing subscriber
pub mod config;
pub mod driver;
pub mod error;
pub mod logging;
pub mod repository;
pub mod scenario;
pub mod sink;
pub mod sweep;

pub use config::{LogConfig, RuntimeConfig};
pub use driver::{CancelFlag, RunSummary, Simulation, Timeline};
pub use error::{Result, RuntimeError};
pub use logging::init_tracing;
pub use repository::{FileDefinitionBackend, RepositoryError};
pub use scenario::{Scenario, TimelineEntry};
pub use sink::{DamageTotals, JsonlReportSink, TotalsSink};
pub use sweep::{SweepJob, SweepResult, run_sweep};
