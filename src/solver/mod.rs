pub mod engine;

pub use engine::{
    BranchBoundEngine, Constraint, EngineError, EngineStatus, IlpModel, Incumbent, SolveOutcome,
    SolverEngine, Variable,
};
