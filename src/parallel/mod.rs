pub mod harness;
pub mod pool;

pub use harness::{run_trials, RunMode, TrialReport};
pub use pool::WorkerPool;
