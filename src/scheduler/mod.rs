//! Per-face job scheduling
//!
//! The baker only needs "run N independent jobs and give me the results in
//! order"; the serial and rayon implementations sit behind [`JobRunner`].

pub mod serial;
pub mod traits;

#[cfg(feature = "parallel")]
pub mod parallel;

pub use serial::SerialRunner;
pub use traits::JobRunner;

#[cfg(feature = "parallel")]
pub use parallel::ParallelRunner;

/// The runner a default build bakes with.
#[cfg(feature = "parallel")]
pub type DefaultRunner = ParallelRunner;
#[cfg(not(feature = "parallel"))]
pub type DefaultRunner = SerialRunner;

/// A [`DefaultRunner`] on `threads` workers, `None` lets the pool decide.
#[cfg(feature = "parallel")]
pub fn default_runner(threads: Option<usize>) -> crate::errors::Result<DefaultRunner> {
    ParallelRunner::new(threads)
}

#[cfg(not(feature = "parallel"))]
pub fn default_runner(threads: Option<usize>) -> crate::errors::Result<DefaultRunner> {
    if threads.is_some_and(|t| t > 1) {
        log::warn!("built without the parallel feature, running on one thread");
    }
    Ok(SerialRunner::new())
}
