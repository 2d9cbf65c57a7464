//! Optimizer output record. Solver outcomes are data, never errors: callers
//! inspect the status and decide whether to retry with a larger budget.

use serde::Serialize;

use crate::data::player::OrderStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SolveStatus {
    /// Proven best assignment.
    Optimal,
    /// Best assignment found before the solve time budget elapsed.
    Feasible,
    /// No assignment satisfies the constraints.
    Infeasible,
    /// The external engine failed to run.
    SolverError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentEntry {
    pub char_id: String,
    pub room_id: String,
    /// Chosen order strategy, for trading rooms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<OrderStrategy>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlgorithmResult {
    pub status: SolveStatus,
    pub objective: f64,
    pub assignments: Vec<AssignmentEntry>,
    /// LP-format dump of the formulation, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lp_problem: Option<String>,
    /// Incumbent-by-incumbent solve log, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution_details: Option<String>,
}

impl AlgorithmResult {
    pub fn solver_error() -> Self {
        AlgorithmResult {
            status: SolveStatus::SolverError,
            objective: 0.0,
            assignments: Vec::new(),
            lp_problem: None,
            solution_details: None,
        }
    }

    pub fn is_assignment_usable(&self) -> bool {
        matches!(self.status, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}
