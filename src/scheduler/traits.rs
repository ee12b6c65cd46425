//! Traits defining job scheduling for dependency inversion

/// Runs independent jobs over a worker pool.
///
/// Every index in `0..count` is passed to `job` exactly once, and the results
/// come back in index order whatever order the jobs ran in.
pub trait JobRunner: Sync {
    fn run<T, F>(&self, label: &str, count: usize, job: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send;
}
