use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::trace;

use crate::future::Task;
use crate::pool::Shared;

pub(crate) fn spawn_worker(
    id: usize,
    name_prefix: &str,
    stack_size: usize,
    shared: Arc<Shared>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("{}{}", name_prefix, id))
        .stack_size(stack_size)
        .spawn(move || {
            trace!(id, "worker started");

            loop {
                // wait until something may be ready: new work or a completion
                shared.signal.consume();

                if shared.is_shutdown() {
                    break;
                }

                match shared.stack.pop() {
                    Some(task) => execute(&shared, task),
                    // the event was a completion meant for some awaiter,
                    // hand the notification back
                    None => shared.signal.raise(),
                }
            }

            trace!(id, "worker exited");
        })
}

// run a claimed task and announce its completion
pub(crate) fn execute(shared: &Shared, task: Arc<dyn Task>) {
    task.run();
    shared.signal.raise();
}
