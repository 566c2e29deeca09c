use parking_lot::{Condvar, Mutex};

/// Counting event signal shared by workers and awaiting threads.
///
/// The count is the number of outstanding notifications: one is raised for
/// every task pushed onto the pending stack and one for every task that
/// finishes. Notifications are untagged, so a consumer cannot tell whether
/// the event it took was new work or someone else's completion; callers that
/// find nothing usable must raise the signal again to hand the notification
/// to another thread.
pub(crate) struct Signal {
    count: Mutex<usize>,
    available: Condvar,
}

impl Signal {
    pub(crate) fn new() -> Self {
        Signal {
            count: Mutex::new(0),
            available: Condvar::new(),
        }
    }

    // raise one event, waking a single blocked consumer if any
    pub(crate) fn raise(&self) {
        let mut count = self.count.lock();
        *count += 1;
        self.available.notify_one();
    }

    // block until at least one event is outstanding, then take it
    pub(crate) fn consume(&self) {
        let mut count = self.count.lock();
        while *count == 0 {
            self.available.wait(&mut count);
        }
        *count -= 1;
    }

    #[cfg(test)]
    pub(crate) fn outstanding(&self) -> usize {
        *self.count.lock()
    }
}
