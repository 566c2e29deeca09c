use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Type-erased view of a future that the pool holds while the future sits on
/// the pending stack or runs on some thread. The pool never owns the future;
/// the handle (and its clones) do.
pub(crate) trait Task: Send + Sync {
    fn run(&self);
}

/// A future that tracks one unit of asynchronous work.
///
/// `TaskFuture` pairs a one-shot task body with an atomic completion flag
/// and an owned result slot. Handles are cheap to clone and share the same
/// underlying state. The body runs exactly once, on whichever pool thread
/// claims it, and the result stays inside the future until [`take`] moves
/// it out.
///
/// [`take`]: TaskFuture::take
pub struct TaskFuture<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for TaskFuture<T> {
    fn clone(&self) -> Self {
        TaskFuture {
            inner: self.inner.clone(),
        }
    }
}

struct Inner<T> {
    state: Mutex<TaskState<T>>,
    completed: AtomicBool,
    // whether some join has consumed this future's completion event
    acknowledged: AtomicBool,
}

enum TaskState<T> {
    Ready(Box<dyn FnOnce() -> T + Send>),
    Running,
    Done(Option<T>),
}

impl<T: Send + 'static> TaskFuture<T> {
    /// Create a future from a task body.
    ///
    /// The future starts out incomplete and does nothing until it is
    /// submitted to a pool.
    pub fn new<F>(body: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        TaskFuture {
            inner: Arc::new(Inner {
                state: Mutex::new(TaskState::Ready(Box::new(body))),
                completed: AtomicBool::new(false),
                acknowledged: AtomicBool::new(false),
            }),
        }
    }

    pub(crate) fn task(&self) -> Arc<dyn Task> {
        self.inner.clone()
    }
}

impl<T> TaskFuture<T> {
    // claim the right to consume this future's completion event; true for
    // exactly one caller over the future's lifetime
    pub(crate) fn acknowledge(&self) -> bool {
        self.inner
            .acknowledged
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl<T> TaskFuture<T> {
    /// Check whether the task body has finished without blocking.
    ///
    /// Once this returns `true` it never returns `false` again.
    pub fn is_complete(&self) -> bool {
        self.inner.completed.load(Ordering::Acquire)
    }

    /// Move the result out of a completed future.
    ///
    /// Returns `None` while the future is incomplete and after the result
    /// has already been taken.
    pub fn take(&self) -> Option<T> {
        if !self.is_complete() {
            return None;
        }
        match &mut *self.inner.state.lock() {
            TaskState::Done(slot) => slot.take(),
            _ => None,
        }
    }
}

impl<T: Send> Task for Inner<T> {
    fn run(&self) {
        let body = {
            let mut state = self.state.lock();
            match mem::replace(&mut *state, TaskState::Running) {
                TaskState::Ready(body) => body,
                // already claimed by another thread, leave it untouched
                previous => {
                    *state = previous;
                    return;
                }
            }
        };

        let value = body();

        *self.state.lock() = TaskState::Done(Some(value));
        self.completed.store(true, Ordering::Release);
    }
}
