//! External solver engine boundary: a 0-1 integer program in, a solve
//! outcome out. The optimizer formulates [IlpModel]s and consumes
//! [SolveOutcome]s; it never depends on how the engine searches.
//!
//! The shipped engine is a deterministic depth-first branch-and-bound:
//! variables are branched most-valuable-first, nodes are pruned on a
//! remaining-positive-gain bound and on per-constraint reachability. Given
//! identical models it produces identical outcomes regardless of thread
//! context, which the concurrent test harness relies on.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

const EPS: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub objective: f64,
}

/// One linear constraint: sum of `coefficient * variable` <= `rhs`.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub name: String,
    pub terms: Vec<(usize, f64)>,
    pub rhs: f64,
}

#[derive(Debug, Clone, Default)]
pub struct IlpModel {
    pub variables: Vec<Variable>,
    pub constraints: Vec<Constraint>,
}

impl IlpModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_variable(&mut self, name: impl Into<String>, objective: f64) -> usize {
        self.variables.push(Variable {
            name: name.into(),
            objective,
        });
        self.variables.len() - 1
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, terms: Vec<(usize, f64)>, rhs: f64) {
        self.constraints.push(Constraint {
            name: name.into(),
            terms,
            rhs,
        });
    }

    /// Render the model in CPLEX LP format, for the problem-dump artifact.
    pub fn to_lp_format(&self) -> String {
        fn push_terms(out: &mut String, terms: &[(f64, &str)]) {
            for (position, (coefficient, name)) in terms.iter().enumerate() {
                if position == 0 {
                    out.push_str(&format!("{coefficient} {name}"));
                } else if *coefficient < 0.0 {
                    out.push_str(&format!(" - {} {name}", -coefficient));
                } else {
                    out.push_str(&format!(" + {coefficient} {name}"));
                }
            }
        }

        let mut out = String::from("\\ 0-1 assignment problem\nMaximize\n obj: ");
        let objective_terms: Vec<(f64, &str)> = self
            .variables
            .iter()
            .filter(|variable| variable.objective != 0.0)
            .map(|variable| (variable.objective, variable.name.as_str()))
            .collect();
        if objective_terms.is_empty() {
            out.push('0');
        } else {
            push_terms(&mut out, &objective_terms);
        }
        out.push_str("\nSubject To\n");
        for constraint in &self.constraints {
            out.push_str(&format!(" {}: ", constraint.name));
            let terms: Vec<(f64, &str)> = constraint
                .terms
                .iter()
                .map(|(index, coefficient)| (*coefficient, self.variables[*index].name.as_str()))
                .collect();
            if terms.is_empty() {
                out.push('0');
            } else {
                push_terms(&mut out, &terms);
            }
            out.push_str(&format!(" <= {}\n", constraint.rhs));
        }
        out.push_str("Binary\n");
        for variable in &self.variables {
            out.push_str(&format!(" {}\n", variable.name));
        }
        out.push_str("End\n");
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    /// Search space exhausted; the returned solution is optimal.
    Optimal,
    /// Wall-clock budget elapsed; the returned solution (if any) is the best
    /// incumbent found so far.
    TimeLimit,
    /// No assignment satisfies the constraints.
    Infeasible,
}

/// One improving solution found during the search, timestamped for the
/// solution-detail dump.
#[derive(Debug, Clone)]
pub struct Incumbent {
    pub objective: f64,
    pub values: Vec<bool>,
    pub found_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub status: EngineStatus,
    pub objective: f64,
    /// Per-variable values of the best solution; `None` when the engine
    /// stopped before finding any feasible point.
    pub values: Option<Vec<bool>>,
    pub incumbents: Vec<Incumbent>,
    pub nodes_explored: u64,
}

#[derive(Debug)]
pub enum EngineError {
    NonFiniteCoefficient { location: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::NonFiniteCoefficient { location } => {
                write!(f, "non-finite coefficient in {location}")
            }
        }
    }
}

impl std::error::Error for EngineError {}

pub trait SolverEngine {
    fn solve(&self, model: &IlpModel, time_limit: Duration) -> Result<SolveOutcome, EngineError>;
}

/// Deterministic depth-first branch-and-bound over binary variables.
#[derive(Debug, Clone, Copy)]
pub struct BranchBoundEngine {
    /// How many nodes between wall-clock checks.
    pub clock_check_interval: u64,
}

impl Default for BranchBoundEngine {
    fn default() -> Self {
        BranchBoundEngine {
            clock_check_interval: 1024,
        }
    }
}

struct SearchContext<'m> {
    model: &'m IlpModel,
    /// Branch order: variable indices, most valuable objective first.
    order: Vec<usize>,
    /// suffix_gain[d] = best objective still reachable from depth d.
    suffix_gain: Vec<f64>,
    /// min_remaining[c][d] = lowest LHS contribution constraint c can still
    /// receive from variables at depth >= d.
    min_remaining: Vec<Vec<f64>>,
    /// terms_by_variable[v] = (constraint index, coefficient) pairs.
    terms_by_variable: Vec<Vec<(usize, f64)>>,
    values: Vec<bool>,
    lhs: Vec<f64>,
    current_objective: f64,
    best: Option<(f64, Vec<bool>)>,
    incumbents: Vec<Incumbent>,
    deadline: Instant,
    nodes: u64,
    clock_check_interval: u64,
    timed_out: bool,
}

impl SolverEngine for BranchBoundEngine {
    fn solve(&self, model: &IlpModel, time_limit: Duration) -> Result<SolveOutcome, EngineError> {
        validate(model)?;

        let variable_count = model.variables.len();
        let constraint_count = model.constraints.len();

        let mut order: Vec<usize> = (0..variable_count).collect();
        order.sort_by(|&left, &right| {
            model.variables[right]
                .objective
                .total_cmp(&model.variables[left].objective)
                .then(left.cmp(&right))
        });

        let mut suffix_gain = vec![0.0; variable_count + 1];
        for depth in (0..variable_count).rev() {
            suffix_gain[depth] =
                suffix_gain[depth + 1] + model.variables[order[depth]].objective.max(0.0);
        }

        let mut terms_by_variable: Vec<Vec<(usize, f64)>> = vec![Vec::new(); variable_count];
        for (constraint_index, constraint) in model.constraints.iter().enumerate() {
            for &(variable_index, coefficient) in &constraint.terms {
                terms_by_variable[variable_index].push((constraint_index, coefficient));
            }
        }

        let mut min_remaining = vec![vec![0.0; variable_count + 1]; constraint_count];
        for depth in (0..variable_count).rev() {
            let variable_index = order[depth];
            for constraint_index in 0..constraint_count {
                min_remaining[constraint_index][depth] = min_remaining[constraint_index][depth + 1];
            }
            for &(constraint_index, coefficient) in &terms_by_variable[variable_index] {
                min_remaining[constraint_index][depth] += coefficient.min(0.0);
            }
        }

        let mut context = SearchContext {
            model,
            order,
            suffix_gain,
            min_remaining,
            terms_by_variable,
            values: vec![false; variable_count],
            lhs: vec![0.0; constraint_count],
            current_objective: 0.0,
            best: None,
            incumbents: Vec::new(),
            deadline: Instant::now() + time_limit,
            nodes: 0,
            clock_check_interval: self.clock_check_interval.max(1),
            timed_out: false,
        };

        // Seed with the trivial all-zero point when feasible, so a timeout
        // still reports the empty assignment rather than nothing at all.
        if model.constraints.iter().all(|c| c.rhs >= -EPS) {
            context.record_incumbent();
        }

        context.descend(0);

        let status = if context.timed_out {
            EngineStatus::TimeLimit
        } else if context.best.is_some() {
            EngineStatus::Optimal
        } else {
            EngineStatus::Infeasible
        };
        let (objective, values) = match context.best {
            Some((objective, values)) => (objective, Some(values)),
            None => (0.0, None),
        };

        Ok(SolveOutcome {
            status,
            objective,
            values,
            incumbents: context.incumbents,
            nodes_explored: context.nodes,
        })
    }
}

impl SearchContext<'_> {
    fn descend(&mut self, depth: usize) {
        if self.timed_out {
            return;
        }
        self.nodes += 1;
        if self.nodes % self.clock_check_interval == 0 && Instant::now() >= self.deadline {
            self.timed_out = true;
            return;
        }

        // Constraint reachability: even the most favorable completion of the
        // remaining variables cannot repair an overshoot.
        for (constraint_index, constraint) in self.model.constraints.iter().enumerate() {
            if self.lhs[constraint_index] + self.min_remaining[constraint_index][depth]
                > constraint.rhs + EPS
            {
                return;
            }
        }

        // Objective bound: prune when no completion can beat the incumbent.
        if let Some((best_objective, _)) = &self.best {
            if self.current_objective + self.suffix_gain[depth] <= best_objective + EPS {
                return;
            }
        }

        if depth == self.model.variables.len() {
            self.record_incumbent();
            return;
        }

        let variable_index = self.order[depth];
        let objective = self.model.variables[variable_index].objective;

        self.set_variable(variable_index, objective, 1.0);
        self.values[variable_index] = true;
        self.descend(depth + 1);
        self.values[variable_index] = false;
        self.set_variable(variable_index, objective, -1.0);

        self.descend(depth + 1);
    }

    fn set_variable(&mut self, variable_index: usize, objective: f64, direction: f64) {
        self.current_objective += objective * direction;
        let terms = std::mem::take(&mut self.terms_by_variable[variable_index]);
        for &(constraint_index, coefficient) in &terms {
            self.lhs[constraint_index] += coefficient * direction;
        }
        self.terms_by_variable[variable_index] = terms;
    }

    fn record_incumbent(&mut self) {
        let improves = match &self.best {
            None => true,
            Some((best_objective, _)) => self.current_objective > best_objective + EPS,
        };
        if !improves {
            return;
        }
        self.best = Some((self.current_objective, self.values.clone()));
        self.incumbents.push(Incumbent {
            objective: self.current_objective,
            values: self.values.clone(),
            found_at: Utc::now(),
        });
    }
}

fn validate(model: &IlpModel) -> Result<(), EngineError> {
    for variable in &model.variables {
        if !variable.objective.is_finite() {
            return Err(EngineError::NonFiniteCoefficient {
                location: format!("objective of {}", variable.name),
            });
        }
    }
    for constraint in &model.constraints {
        if !constraint.rhs.is_finite()
            || constraint.terms.iter().any(|(_, c)| !c.is_finite())
        {
            return Err(EngineError::NonFiniteCoefficient {
                location: format!("constraint {}", constraint.name),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(model: &IlpModel) -> SolveOutcome {
        BranchBoundEngine::default()
            .solve(model, Duration::from_secs(5))
            .expect("engine should run")
    }

    #[test]
    fn picks_the_better_of_two_exclusive_variables() {
        let mut model = IlpModel::new();
        let cheap = model.add_variable("cheap", 1.0);
        let rich = model.add_variable("rich", 5.0);
        model.add_constraint("exclusive", vec![(cheap, 1.0), (rich, 1.0)], 1.0);

        let outcome = solve(&model);
        assert_eq!(outcome.status, EngineStatus::Optimal);
        assert_eq!(outcome.objective, 5.0);
        let values = outcome.values.expect("solution");
        assert!(!values[cheap]);
        assert!(values[rich]);
    }

    #[test]
    fn knapsack_respects_the_budget() {
        let mut model = IlpModel::new();
        let a = model.add_variable("a", 6.0);
        let b = model.add_variable("b", 5.0);
        let c = model.add_variable("c", 5.0);
        // weights 3, 2, 2 with budget 4: best is b + c = 10, not a alone.
        model.add_constraint("budget", vec![(a, 3.0), (b, 2.0), (c, 2.0)], 4.0);

        let outcome = solve(&model);
        assert_eq!(outcome.status, EngineStatus::Optimal);
        assert_eq!(outcome.objective, 10.0);
        let values = outcome.values.expect("solution");
        assert!(!values[a]);
        assert!(values[b] && values[c]);
    }

    #[test]
    fn negative_rhs_without_relief_is_infeasible() {
        let mut model = IlpModel::new();
        let x = model.add_variable("x", 1.0);
        model.add_constraint("impossible", vec![(x, 1.0)], -1.0);

        let outcome = solve(&model);
        assert_eq!(outcome.status, EngineStatus::Infeasible);
        assert!(outcome.values.is_none());
    }

    #[test]
    fn coupling_constraints_with_negative_coefficients_hold() {
        let mut model = IlpModel::new();
        let worker = model.add_variable("worker", 4.0);
        let gate = model.add_variable("gate", 0.0);
        // worker <= gate
        model.add_constraint("coupling", vec![(worker, 1.0), (gate, -1.0)], 0.0);

        let outcome = solve(&model);
        assert_eq!(outcome.status, EngineStatus::Optimal);
        let values = outcome.values.expect("solution");
        assert!(values[worker]);
        assert!(values[gate], "gate must open for the worker to count");
    }

    #[test]
    fn empty_model_is_trivially_optimal() {
        let outcome = solve(&IlpModel::new());
        assert_eq!(outcome.status, EngineStatus::Optimal);
        assert_eq!(outcome.objective, 0.0);
        assert_eq!(outcome.values.expect("solution").len(), 0);
    }

    #[test]
    fn rejects_non_finite_coefficients() {
        let mut model = IlpModel::new();
        model.add_variable("bad", f64::NAN);
        let err = BranchBoundEngine::default()
            .solve(&model, Duration::from_secs(1))
            .expect_err("NaN objective must be rejected");
        assert!(matches!(err, EngineError::NonFiniteCoefficient { .. }));
    }

    #[test]
    fn lp_dump_lists_objective_constraints_and_binaries() {
        let mut model = IlpModel::new();
        let x = model.add_variable("x_a", 2.5);
        let y = model.add_variable("y_b", 0.0);
        model.add_constraint("cap", vec![(x, 1.0), (y, -1.0)], 1.0);

        let dump = model.to_lp_format();
        assert!(dump.contains("Maximize"));
        assert!(dump.contains("2.5 x_a"));
        assert!(dump.contains("cap: 1 x_a - 1 y_b <= 1"));
        assert!(dump.contains("Binary"));
        assert!(dump.ends_with("End\n"));
    }
}
