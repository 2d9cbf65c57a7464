pub mod model;
pub mod params;
pub mod result;

use std::fmt::Write as _;
use std::time::{Duration, Instant};

use crate::data::player::PlayerState;
use crate::data::registry::GameDataRegistry;
use crate::solver::{BranchBoundEngine, EngineStatus, IlpModel, SolveOutcome, SolverEngine};

pub use model::{build_model, ModelMap, VariableRole};
pub use params::{assemble_parameters, Operator, ParameterSet, RoomModel};
pub use result::{AlgorithmResult, AssignmentEntry, SolveStatus};

/// Default modeled production horizon: 16 in-game hours.
pub const DEFAULT_MODEL_TIME_LIMIT: f64 = 57600.0;
/// Default wall-clock budget for one solve.
pub const DEFAULT_SOLVE_TIME_LIMIT: f64 = 20.0;

#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Modeled production horizon in seconds; the objective measures output
    /// over this span.
    pub model_time_limit: f64,
    /// Wall-clock solve budget in seconds.
    pub solve_time_limit: f64,
    /// Attach an LP-format dump of the formulation to the result.
    pub gen_lp_file: bool,
    /// Attach an incumbent-by-incumbent solve log to the result.
    pub gen_solution_details: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            model_time_limit: DEFAULT_MODEL_TIME_LIMIT,
            solve_time_limit: DEFAULT_SOLVE_TIME_LIMIT,
            gen_lp_file: false,
            gen_solution_details: false,
        }
    }
}

/// One full optimizer run: assemble parameters, formulate, solve, extract.
pub fn solve_assignment(
    registry: &GameDataRegistry,
    player: &PlayerState,
    config: &SolverConfig,
) -> AlgorithmResult {
    let params = assemble_parameters(registry, player);
    solve_with_params(&params, config)
}

pub fn solve_with_params(params: &ParameterSet, config: &SolverConfig) -> AlgorithmResult {
    let build_started = Instant::now();
    let (model, map) = build_model(params, config);
    log::debug!(
        "formulated {} variables / {} constraints in {:.1}ms",
        model.variables.len(),
        model.constraints.len(),
        build_started.elapsed().as_secs_f64() * 1000.0
    );

    let engine = BranchBoundEngine::default();
    let time_limit = Duration::from_secs_f64(config.solve_time_limit.max(0.0));
    let outcome = match engine.solve(&model, time_limit) {
        Ok(outcome) => outcome,
        Err(err) => {
            log::warn!("solver engine failed: {err}");
            return AlgorithmResult::solver_error();
        }
    };

    extract_result(params, &model, &map, &outcome, config)
}

fn extract_result(
    params: &ParameterSet,
    model: &IlpModel,
    map: &ModelMap,
    outcome: &SolveOutcome,
    config: &SolverConfig,
) -> AlgorithmResult {
    let status = match (outcome.status, &outcome.values) {
        (EngineStatus::Optimal, _) => SolveStatus::Optimal,
        (EngineStatus::TimeLimit, Some(_)) => SolveStatus::Feasible,
        (EngineStatus::TimeLimit, None) => {
            log::warn!("solve budget elapsed before any feasible point was found");
            SolveStatus::SolverError
        }
        (EngineStatus::Infeasible, _) => SolveStatus::Infeasible,
    };

    let mut assignments = match &outcome.values {
        Some(values) => collect_assignments(params, map, values),
        None => Vec::new(),
    };
    assignments.sort_by(|left, right| {
        left.char_id
            .cmp(&right.char_id)
            .then_with(|| left.room_id.cmp(&right.room_id))
    });

    let objective = match status {
        SolveStatus::Optimal | SolveStatus::Feasible => outcome.objective,
        _ => 0.0,
    };

    AlgorithmResult {
        status,
        objective,
        assignments,
        lp_problem: config.gen_lp_file.then(|| model.to_lp_format()),
        solution_details: config
            .gen_solution_details
            .then(|| render_solution_details(params, map, outcome)),
    }
}

fn collect_assignments(
    params: &ParameterSet,
    map: &ModelMap,
    values: &[bool],
) -> Vec<AssignmentEntry> {
    map.roles
        .iter()
        .zip(values)
        .filter(|(_, &chosen)| chosen)
        .filter_map(|(role, _)| match *role {
            VariableRole::Assign {
                operator,
                room,
                strategy,
            } => Some(AssignmentEntry {
                char_id: params.operators[operator].char_id.clone(),
                room_id: params.rooms[room].id.clone(),
                strategy,
            }),
            VariableRole::StrategyGate { .. } => None,
        })
        .collect()
}

/// Text log of every improving solution the engine found, for the
/// solution-detail artifact.
fn render_solution_details(params: &ParameterSet, map: &ModelMap, outcome: &SolveOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} incumbent(s), {} node(s) explored",
        outcome.incumbents.len(),
        outcome.nodes_explored
    );
    for (number, incumbent) in outcome.incumbents.iter().enumerate() {
        let _ = writeln!(
            out,
            "[{}] #{} objective {:.3}",
            incumbent.found_at.format("%Y-%m-%d %H:%M:%S%.3f UTC"),
            number + 1,
            incumbent.objective
        );
        for entry in collect_assignments(params, map, &incumbent.values) {
            match entry.strategy {
                Some(strategy) => {
                    let _ = writeln!(out, "  {} -> {} ({strategy})", entry.char_id, entry.room_id);
                }
                None => {
                    let _ = writeln!(out, "  {} -> {}", entry.char_id, entry.room_id);
                }
            }
        }
    }
    out
}
