//! Serial implementation of job scheduling

use crate::scheduler::traits::JobRunner;

/// Runs jobs one after another on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialRunner;

impl SerialRunner {
    pub const fn new() -> Self {
        SerialRunner
    }
}

impl JobRunner for SerialRunner {
    fn run<T, F>(&self, label: &str, count: usize, job: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        log::debug!("{label}: {count} jobs");
        let step = (count / 10).max(1);
        (0..count)
            .map(|i| {
                if i % step == 0 {
                    log::trace!("{label}: {}%", i * 100 / count.max(1));
                }
                job(i)
            })
            .collect()
    }
}
