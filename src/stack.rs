use std::sync::Arc;

use parking_lot::Mutex;

use crate::future::Task;

/// LIFO store of tasks that have been submitted but not yet claimed.
///
/// Last submitted runs first.
pub(crate) struct TaskStack {
    entries: Mutex<Vec<Arc<dyn Task>>>,
}

impl TaskStack {
    pub(crate) fn new() -> Self {
        TaskStack {
            entries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn push(&self, task: Arc<dyn Task>) {
        self.entries.lock().push(task);
    }

    // claiming a task and removing it from the store are one atomic step
    pub(crate) fn pop(&self) -> Option<Arc<dyn Task>> {
        self.entries.lock().pop()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }
}
