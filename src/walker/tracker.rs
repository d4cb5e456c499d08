//! Outstanding-work tracking for a self-expanding task graph
//!
//! Running tasks spawn more tasks, so an empty queue does not mean the walk is
//! over: a task may be mid-listing and about to submit children. The tracker
//! counts every task from the moment it is spawned until it completes, and the
//! walk is done exactly when that count returns to zero.

use crate::error::PoolResult;
use crate::walker::queue::TaskSender;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// Counter of spawned-but-not-completed tasks
#[derive(Debug, Default)]
pub struct TaskTracker {
    outstanding: Mutex<usize>,
    idle: Condvar,
}

impl TaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a task that is about to be submitted
    ///
    /// Must happen before submission so a fast task can never complete before
    /// it was counted.
    pub fn on_spawn(&self) {
        *self.outstanding.lock() += 1;
    }

    /// Count a finished task; wakes waiters when nothing is left
    pub fn on_complete(&self) {
        let mut outstanding = self.outstanding.lock();
        *outstanding = outstanding
            .checked_sub(1)
            .expect("task completed more times than it was spawned");
        if *outstanding == 0 {
            trace!("All tracked tasks completed");
            self.idle.notify_all();
        }
    }

    /// Current outstanding count, for polling
    pub fn outstanding(&self) -> usize {
        *self.outstanding.lock()
    }

    /// Block until the outstanding count is zero
    pub fn wait(&self) {
        let mut outstanding = self.outstanding.lock();
        while *outstanding > 0 {
            self.idle.wait(&mut outstanding);
        }
    }

    /// Like [`TaskTracker::wait`], giving up after `timeout`
    ///
    /// Returns `true` if the count reached zero.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut outstanding = self.outstanding.lock();
        if *outstanding > 0 {
            let _ = self
                .idle
                .wait_while_for(&mut outstanding, |n| *n > 0, timeout);
        }
        *outstanding == 0
    }
}

/// Calls [`TaskTracker::on_complete`] exactly once when dropped
///
/// Dropping on unwind keeps the count correct when a task panics, and
/// dropping an unrun task (abandoned queue) releases its slot too.
pub struct CompletionGuard {
    tracker: Arc<TaskTracker>,
}

impl CompletionGuard {
    fn new(tracker: Arc<TaskTracker>) -> Self {
        Self { tracker }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.tracker.on_complete();
    }
}

/// Spawns tasks that the tracker accounts for
#[derive(Clone)]
pub struct TaskScope {
    sender: TaskSender,
    tracker: Arc<TaskTracker>,
}

impl TaskScope {
    pub fn new(sender: TaskSender, tracker: Arc<TaskTracker>) -> Self {
        Self { sender, tracker }
    }

    pub fn tracker(&self) -> &Arc<TaskTracker> {
        &self.tracker
    }

    /// Count, then submit `task`
    ///
    /// If the pool rejects the task the count is released again (the rejected
    /// closure and its guard are dropped) and the error is returned.
    pub fn spawn<F>(&self, task: F) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.tracker.on_spawn();
        let guard = CompletionGuard::new(Arc::clone(&self.tracker));
        self.sender.submit(Box::new(move || {
            let _guard = guard;
            task();
        }))
    }
}
