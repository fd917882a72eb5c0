//! Parallel processing strategies

use rayon::prelude::*;
use regrowth_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Processing mode for per-pixel work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMode {
    /// Single-threaded processing
    Sequential,
    /// Parallel processing using all available cores
    #[default]
    Parallel,
    /// Parallel with specified number of threads
    ParallelWith(usize),
}

/// Strategy for parallel execution
pub trait ParallelStrategy {
    /// Map a function over indices and collect results in index order
    fn par_map<T, F>(&self, range: std::ops::Range<usize>, f: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send;
}

impl ParallelStrategy for ProcessingMode {
    fn par_map<T, F>(&self, range: std::ops::Range<usize>, f: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        match self {
            ProcessingMode::Sequential => Ok(range.map(f).collect()),
            ProcessingMode::Parallel => Ok(range.into_par_iter().map(f).collect()),
            ProcessingMode::ParallelWith(threads) => {
                let pool = build_pool(*threads)?;
                Ok(pool.install(|| range.into_par_iter().map(f).collect()))
            }
        }
    }
}

fn build_pool(threads: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| Error::Algorithm(format!("cannot build thread pool: {}", e)))
}

impl ProcessingMode {
    /// Run `op` inside this mode's thread pool, building it at most once.
    ///
    /// `op` receives the mode to use for `par_map` calls made inside it:
    /// `ParallelWith(n)` becomes `Parallel` on the installed `n`-thread pool,
    /// so repeated calls share one pool.
    pub fn install<R, F>(&self, op: F) -> Result<R>
    where
        R: Send,
        F: FnOnce(ProcessingMode) -> R + Send,
    {
        match self {
            ProcessingMode::ParallelWith(threads) => {
                let pool = build_pool(*threads)?;
                Ok(pool.install(|| op(ProcessingMode::Parallel)))
            }
            mode => Ok(op(*mode)),
        }
    }

    /// Worker threads this mode uses from the current context
    pub fn threads(&self) -> usize {
        match self {
            ProcessingMode::Sequential => 1,
            ProcessingMode::Parallel => num_cpus(),
            ProcessingMode::ParallelWith(threads) => *threads,
        }
    }

    /// Mode from an optional thread count: `None` → all cores, `Some(1)` → sequential
    pub fn from_threads(threads: Option<usize>) -> Self {
        match threads {
            None | Some(0) => ProcessingMode::Parallel,
            Some(1) => ProcessingMode::Sequential,
            Some(n) => ProcessingMode::ParallelWith(n),
        }
    }
}

/// Threads of the current rayon pool (all cores outside an installed pool)
pub fn num_cpus() -> usize {
    rayon::current_num_threads()
}
