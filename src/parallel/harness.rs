//! Test/benchmark orchestrator: drive one or many optimizer pipelines over
//! the same inputs, sequentially or concurrently.
//!
//! The registry is built by the caller before any trial starts, so every
//! worker only ever reads published, immutable data. Each trial parses its
//! own player state and owns its solver context end to end; sequential and
//! parallel modes must therefore produce identical result vectors for
//! identical inputs.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::data::player::{PlayerDataError, PlayerState};
use crate::data::registry::GameDataRegistry;
use crate::optimizer::{solve_assignment, AlgorithmResult, SolverConfig};

use super::pool::WorkerPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// One pipeline run.
    Once,
    /// N pipeline runs, one after another.
    Sequential(usize),
    /// N pipeline runs across worker threads, joined before returning.
    Parallel(usize),
}

/// One trial's outcome plus timing instrumentation.
#[derive(Debug, Clone)]
pub struct TrialReport {
    pub result: AlgorithmResult,
    pub elapsed: Duration,
}

fn run_one(
    registry: &GameDataRegistry,
    player_json: &str,
    config: &SolverConfig,
) -> Result<TrialReport, PlayerDataError> {
    let started = Instant::now();
    let player = PlayerState::parse(player_json)?;
    let result = solve_assignment(registry, &player, config);
    Ok(TrialReport {
        result,
        elapsed: started.elapsed(),
    })
}

/// Run the pipeline under the given mode. A trial that fails to parse its
/// player document fails the whole batch with the typed parse error; solver
/// outcomes (including infeasibility) are ordinary results.
pub fn run_trials(
    registry: &Arc<GameDataRegistry>,
    player_json: &str,
    config: &SolverConfig,
    mode: RunMode,
    pool: &WorkerPool,
) -> Result<Vec<TrialReport>, PlayerDataError> {
    let started = Instant::now();
    let reports = match mode {
        RunMode::Once => vec![run_one(registry, player_json, config)?],
        RunMode::Sequential(count) => {
            let mut reports = Vec::with_capacity(count);
            for _ in 0..count {
                reports.push(run_one(registry, player_json, config)?);
            }
            reports
        }
        RunMode::Parallel(count) => {
            let registry = Arc::clone(registry);
            pool.run(|| {
                (0..count)
                    .into_par_iter()
                    .map(|_| run_one(&registry, player_json, config))
                    .collect::<Result<Vec<_>, _>>()
            })?
        }
    };

    log::info!(
        "{} trial(s) completed in {:.1}ms",
        reports.len(),
        started.elapsed().as_secs_f64() * 1000.0
    );
    Ok(reports)
}
