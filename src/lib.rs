// Fork-Pool: fixed-size thread pool with fork-join futures
// A thread pool built around one scheduling protocol:
// - LIFO pending stack shared by all workers
// - a single counting event signal for both "new work" and "work finished"
// - helping: a thread blocked joining a future runs other pending tasks,
//   so recursive fork-join never deadlocks on pool exhaustion
//
// Tasks are plain closures. Each returns its value through the future it
// was submitted with; `TaskFuture::take` moves the result out after
// `ThreadPool::join` observes completion.
mod error;
mod future;
mod pool;
mod signal;
mod stack;
mod worker;

use std::num::NonZeroUsize;

pub use error::SpawnError;
pub use future::TaskFuture;
pub use pool::{Builder, ThreadPool};

// convenience function to create a pool sized to the available parallelism
pub fn new() -> Result<ThreadPool, SpawnError> {
    let worker_count = std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    ThreadPool::new(worker_count)
}

// create a pool with a specific worker count
pub fn with_workers(worker_count: usize) -> Result<ThreadPool, SpawnError> {
    ThreadPool::new(worker_count)
}
