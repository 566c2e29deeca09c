use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::debug;

use crate::error::SpawnError;
use crate::future::TaskFuture;
use crate::signal::Signal;
use crate::stack::TaskStack;
use crate::worker::{self, execute};

// recursive fork-join workloads can nest helper frames deeply, so every
// worker gets a generous fixed stack
const DEFAULT_STACK_SIZE: usize = 64 * 1024 * 1024;

const DEFAULT_NAME_PREFIX: &str = "fp";

/// A fixed-size pool of worker threads executing [`TaskFuture`]s.
///
/// Tasks are claimed LIFO from a shared pending stack. A thread that blocks
/// in [`join`] does not sit idle: while its future is incomplete it executes
/// other pending tasks, so recursive fork-join workloads make progress even
/// when the number of outstanding futures exceeds the number of workers.
///
/// Dropping the pool stops the workers cooperatively. Tasks still pending at
/// that point are abandoned: their bodies never run and their futures never
/// complete. Tasks already running finish first.
///
/// [`join`]: ThreadPool::join
pub struct ThreadPool {
    workers: Vec<JoinHandle<()>>,
    shared: Arc<Shared>,
}

// state shared between the pool handle, its workers, and helping awaiters
pub(crate) struct Shared {
    pub(crate) stack: TaskStack,
    pub(crate) signal: Signal,
    shutdown: AtomicBool,
}

impl Shared {
    pub(crate) fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }
}

/// Thread pool configuration.
pub struct Builder {
    worker_count: usize,
    stack_size: usize,
    name_prefix: String,
}

impl Builder {
    pub fn new() -> Builder {
        let worker_count = std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1);

        Builder {
            worker_count,
            stack_size: DEFAULT_STACK_SIZE,
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
        }
    }

    /// Number of worker threads. Defaults to the available parallelism.
    pub fn worker_count(mut self, val: usize) -> Self {
        self.worker_count = val;
        self
    }

    /// Stack size of each worker thread, in bytes.
    pub fn stack_size(mut self, val: usize) -> Self {
        self.stack_size = val;
        self
    }

    /// Prefix for worker thread names, e.g. `fp0`, `fp1`, ...
    pub fn name_prefix<S: Into<String>>(mut self, val: S) -> Self {
        self.name_prefix = val.into();
        self
    }

    /// Spawn the workers and return the configured pool.
    ///
    /// If a worker thread cannot be created, workers spawned so far are
    /// stopped and joined before the error is returned.
    pub fn build(self) -> Result<ThreadPool, SpawnError> {
        assert!(self.worker_count > 0, "must have at least one worker");

        let shared = Arc::new(Shared {
            stack: TaskStack::new(),
            signal: Signal::new(),
            shutdown: AtomicBool::new(false),
        });

        let mut workers = Vec::with_capacity(self.worker_count);

        for id in 0..self.worker_count {
            match worker::spawn_worker(id, &self.name_prefix, self.stack_size, shared.clone()) {
                Ok(handle) => workers.push(handle),
                Err(source) => {
                    drop(ThreadPool { workers, shared });
                    return Err(SpawnError { worker: id, source });
                }
            }
        }

        debug!(workers = self.worker_count, "thread pool started");

        Ok(ThreadPool { workers, shared })
    }
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}

impl ThreadPool {
    /// Create a pool with `worker_count` threads and default settings.
    pub fn new(worker_count: usize) -> Result<ThreadPool, SpawnError> {
        Builder::new().worker_count(worker_count).build()
    }

    /// Configure a pool before building it.
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Queue an already-constructed future for execution.
    ///
    /// Some pool thread will eventually claim it and run its body. The
    /// future must not currently be enqueued or running.
    pub fn submit<T: Send + 'static>(&self, future: &TaskFuture<T>) {
        self.shared.stack.push(future.task());
        self.shared.signal.raise();
    }

    /// Create a future from `body` and queue it in one step.
    pub fn spawn<T, F>(&self, body: F) -> TaskFuture<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let future = TaskFuture::new(body);
        self.submit(&future);
        future
    }

    /// Block until `future` completes.
    ///
    /// While waiting, the calling thread executes other pending tasks, so
    /// a task body may call `join` on futures it spawned without risking
    /// pool exhaustion. Returns immediately if the future already
    /// completed. A future's completion wakes a single waiter; have one
    /// thread block per future.
    pub fn join<T>(&self, future: &TaskFuture<T>) {
        loop {
            if future.is_complete() {
                // a completed future raised exactly one event; the first
                // join to get here consumes it, repeat joins consume
                // nothing
                if future.acknowledge() {
                    self.shared.signal.consume();
                }
                return;
            }

            self.shared.signal.consume();

            if future.is_complete() {
                if !future.acknowledge() {
                    // another join owns the acknowledgement, the event we
                    // took belongs to someone else
                    self.shared.signal.raise();
                }
                return;
            }

            match self.shared.stack.pop() {
                // help: run someone else's task while we wait, its
                // completion raises a fresh event to replace the one we
                // consumed above
                Some(task) => execute(&self.shared, task),
                // the event was another future's completion, hand it back
                None => self.shared.signal.raise(),
            }
        }
    }

    /// Number of worker threads in the pool.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Number of submitted tasks not yet claimed by any thread.
    pub fn pending_tasks(&self) -> usize {
        self.shared.stack.len()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);

        // one event per worker so every one of them wakes and exits
        for _ in 0..self.workers.len() {
            self.shared.signal.raise();
        }

        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }

        debug!("thread pool stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // every submission and every completion raises one event, every
    // execution and every first join consumes one; once all futures are
    // joined the count must drain back to zero
    #[test]
    fn signal_drains_at_quiescence() {
        let pool = ThreadPool::new(4).unwrap();

        let futures: Vec<_> = (0..64).map(|i| pool.spawn(move || i * 2)).collect();
        for future in &futures {
            pool.join(future);
        }

        // a worker may still be holding an event it is about to hand back
        std::thread::sleep(std::time::Duration::from_millis(50));
        assert_eq!(pool.shared.signal.outstanding(), 0);

        for (i, future) in futures.iter().enumerate() {
            assert_eq!(future.take(), Some(i * 2));
        }
    }

    #[test]
    fn pending_counts_unclaimed_tasks() {
        let pool = ThreadPool::new(1).unwrap();
        assert_eq!(pool.pending_tasks(), 0);

        let (gate_tx, gate_rx) = std::sync::mpsc::channel::<()>();
        let blocker = pool.spawn(move || {
            gate_rx.recv().unwrap();
        });

        // wait for the worker to claim the blocker
        while pool.pending_tasks() > 0 {
            std::thread::yield_now();
        }

        let queued = pool.spawn(|| 7);
        assert_eq!(pool.pending_tasks(), 1);

        gate_tx.send(()).unwrap();
        pool.join(&queued);
        pool.join(&blocker);
        assert_eq!(pool.pending_tasks(), 0);
        assert_eq!(queued.take(), Some(7));
    }
}
