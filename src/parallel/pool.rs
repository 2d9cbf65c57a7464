//! Rayon thread pool configuration for concurrent optimizer trials.
//!
//! Use [WorkerPool::run] to execute the parallel harness with a fixed worker
//! count, or rely on Rayon's default (all CPU cores).

use rayon::ThreadPoolBuilder;

/// Configures how many worker threads drive concurrent trials.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerPool {
    /// Number of worker threads. If 0, use Rayon's default (num_cpus).
    pub workers: usize,
}

impl WorkerPool {
    /// Use all available CPU cores (Rayon default).
    pub fn default_workers() -> Self {
        Self::default()
    }

    /// Use exactly `n` worker threads.
    pub fn with_workers(n: usize) -> Self {
        Self { workers: n }
    }

    /// Run a closure with this pool's worker count. With [workers](WorkerPool::workers)
    /// at 0 the global Rayon pool is used; otherwise a dedicated pool is
    /// built for the call and torn down afterwards.
    pub fn run<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if self.workers == 0 {
            return f();
        }
        match ThreadPoolBuilder::new().num_threads(self.workers).build() {
            Ok(pool) => pool.install(f),
            Err(err) => {
                log::warn!("dedicated thread pool unavailable ({err}); using the global pool");
                f()
            }
        }
    }
}
