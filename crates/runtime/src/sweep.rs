//! Parameter sweep: many independent simulations in parallel.
//!
//! Every job builds its own registry, world and scheduler inside its task,
//! so runs never share mutable state. The engine is synchronous; jobs run on
//! tokio's blocking pool and the sweep only awaits their completion.

use std::sync::Arc;

use sim_core::{BuffRegistry, SimConfig};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::driver::{CancelFlag, RunSummary, Simulation};
use crate::error::{Result, RuntimeError};
use crate::scenario::Scenario;
use crate::sink::{DamageTotals, TotalsSink};

/// One point of the sweep.
#[derive(Clone, Debug)]
pub struct SweepJob {
    pub name: String,
    pub config: SimConfig,
    pub total_ticks: u64,
    pub scenario: Arc<Scenario>,
}

impl SweepJob {
    pub fn new(name: impl Into<String>, scenario: Arc<Scenario>, total_ticks: u64) -> Self {
        Self {
            name: name.into(),
            config: SimConfig::default(),
            total_ticks,
            scenario,
        }
    }

    pub fn with_config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs the job to completion on the current thread.
    pub fn run(&self, cancel: &CancelFlag) -> Result<SweepResult> {
        let totals = TotalsSink::new();
        let world = self
            .scenario
            .build_world(&self.config, BuffRegistry::in_memory())?
            .with_sink(totals.clone());
        let mut simulation = Simulation::new(world, self.scenario.timeline())?;
        let summary = simulation.run(self.total_ticks, cancel)?;

        Ok(SweepResult {
            name: self.name.clone(),
            summary,
            totals: totals.totals(),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SweepResult {
    pub name: String,
    pub summary: RunSummary,
    pub totals: DamageTotals,
}

/// Runs every job and returns results in job order.
///
/// The first failing job cancels the remaining ones and its error is
/// returned.
pub async fn run_sweep(jobs: Vec<SweepJob>, cancel: CancelFlag) -> Result<Vec<SweepResult>> {
    let count = jobs.len();
    info!(target: "runtime::sweep", jobs = count, "sweep started");

    let mut set = JoinSet::new();
    for (index, job) in jobs.into_iter().enumerate() {
        let cancel = cancel.clone();
        set.spawn_blocking(move || (index, job.run(&cancel)));
    }

    let mut results: Vec<Option<SweepResult>> = vec![None; count];
    let mut failure = None;
    while let Some(joined) = set.join_next().await {
        let outcome = match joined {
            Ok((index, outcome)) => outcome.map(|result| (index, result)),
            Err(err) => Err(RuntimeError::WorkerJoin(err)),
        };
        match outcome {
            Ok((index, result)) => results[index] = Some(result),
            Err(err) => {
                warn!(target: "runtime::sweep", error = %err, "sweep job failed");
                cancel.cancel();
                failure.get_or_insert(err);
            }
        }
    }

    if let Some(err) = failure {
        return Err(err);
    }

    let results: Vec<SweepResult> = results.into_iter().flatten().collect();
    info!(
        target: "runtime::sweep",
        completed = results.len(),
        cancelled = results.iter().filter(|r| r.summary.cancelled).count(),
        "sweep finished"
    );
    Ok(results)
}
