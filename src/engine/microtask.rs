//! Microtask queue - deferred work that runs after the current handler.
//!
//! Focus moves triggered by navigation are queued here rather than performed
//! inside the key handler, so the highlighted index is committed (and any
//! reactive effects have run) before the element is focused. The host drains
//! the queue with [`run_microtasks`] at the end of each event dispatch.

use std::cell::RefCell;
use std::collections::VecDeque;

use tracing::trace;

thread_local! {
    static MICROTASKS: RefCell<VecDeque<Box<dyn FnOnce()>>> = RefCell::new(VecDeque::new());
}

/// Queue `task` to run on the next [`run_microtasks`].
pub fn queue_microtask(task: impl FnOnce() + 'static) {
    MICROTASKS.with(|queue| queue.borrow_mut().push_back(Box::new(task)));
}

/// Flush pending signal effects, then run queued tasks in FIFO order until
/// the queue is empty (tasks queued by tasks included). Returns how many ran.
pub fn run_microtasks() -> usize {
    spark_signals::flush_sync();

    let mut ran = 0;
    while let Some(task) = MICROTASKS.with(|queue| queue.borrow_mut().pop_front()) {
        task();
        ran += 1;
    }

    if ran > 0 {
        trace!(ran, "drained microtasks");
    }
    ran
}

/// Number of tasks waiting to run.
pub fn pending_microtasks() -> usize {
    MICROTASKS.with(|queue| queue.borrow().len())
}

/// Drop all queued tasks without running them.
pub fn clear_microtasks() {
    MICROTASKS.with(|queue| queue.borrow_mut().clear());
}
