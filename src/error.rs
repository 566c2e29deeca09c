use std::io;

use thiserror::Error;

/// The pool could not bring up one of its worker threads.
///
/// Workers spawned before the failure have already been stopped and joined
/// by the time this error is returned. Treat the failure as fatal rather
/// than retrying with the same configuration.
#[derive(Debug, Error)]
#[error("failed to spawn worker thread {worker}")]
pub struct SpawnError {
    pub(crate) worker: usize,
    #[source]
    pub(crate) source: io::Error,
}

impl SpawnError {
    /// Index of the worker that failed to spawn.
    pub fn worker(&self) -> usize {
        self.worker
    }
}
