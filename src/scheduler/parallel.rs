//! Parallel implementation of job scheduling

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::errors::{BakeError, Result};
use crate::scheduler::traits::JobRunner;

/// Runs jobs on a rayon pool, the global one unless a thread count is given.
#[cfg(feature = "parallel")]
#[derive(Debug, Default)]
pub struct ParallelRunner {
    pool: Option<rayon::ThreadPool>,
}

#[cfg(feature = "parallel")]
impl ParallelRunner {
    pub fn new(threads: Option<usize>) -> Result<Self> {
        let pool = match threads {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| BakeError::ThreadPool(e.to_string()))?,
            ),
            None => None,
        };
        Ok(ParallelRunner { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool
            .as_ref()
            .map_or_else(rayon::current_num_threads, |pool| pool.current_num_threads())
    }
}

#[cfg(feature = "parallel")]
impl JobRunner for ParallelRunner {
    fn run<T, F>(&self, label: &str, count: usize, job: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        log::debug!("{label}: {count} jobs on {} threads", self.threads());
        let run = || -> Vec<T> { (0..count).into_par_iter().map(&job).collect() };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}
