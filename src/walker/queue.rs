//! Unbounded FIFO task queue shared by the worker pool
//!
//! Submitting a task wakes exactly one blocked worker. Once the queue is
//! marked stopping, workers drain what is left and then exit; submissions
//! are still accepted while draining so running tasks can spawn more work.
//! After the pool has fully stopped the queue is closed and submissions fail.

use crate::error::{PoolError, PoolResult};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// A deferred, zero-argument unit of work
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Statistics for the task queue
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Total tasks submitted
    pub submitted: AtomicU64,

    /// Total tasks handed to workers
    pub dequeued: AtomicU64,

    /// Highest queue length observed
    pub peak_len: AtomicUsize,
}

impl QueueStats {
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    pub fn dequeued(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }

    pub fn peak_len(&self) -> usize {
        self.peak_len.load(Ordering::Relaxed)
    }
}

struct QueueState {
    tasks: VecDeque<Task>,
    stopping: bool,
    closed: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    available: Condvar,
    stats: QueueStats,
}

/// Task queue; hand out [`TaskSender`]s and [`TaskReceiver`]s from it
pub struct TaskQueue {
    shared: Arc<Shared>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(QueueState {
                    tasks: VecDeque::new(),
                    stopping: false,
                    closed: false,
                }),
                available: Condvar::new(),
                stats: QueueStats::default(),
            }),
        }
    }

    /// Get a sender for this queue
    pub fn sender(&self) -> TaskSender {
        TaskSender {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Get a receiver for this queue (one per worker)
    pub fn receiver(&self) -> TaskReceiver {
        TaskReceiver {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn stats(&self) -> &QueueStats {
        &self.shared.stats
    }

    pub fn len(&self) -> usize {
        self.shared.state.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Begin draining: wake every worker so idle ones can exit
    pub fn begin_stop(&self) {
        self.shared.state.lock().stopping = true;
        self.shared.available.notify_all();
    }

    /// Reject all further submissions
    ///
    /// Returns the number of tasks still queued, which nobody will run.
    pub fn close(&self) -> usize {
        let abandoned: Vec<Task> = {
            let mut state = self.shared.state.lock();
            state.closed = true;
            state.tasks.drain(..).collect()
        };
        // Dropped outside the lock; task guards may run on drop
        abandoned.len()
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for submitting tasks
#[derive(Clone)]
pub struct TaskSender {
    shared: Arc<Shared>,
}

impl TaskSender {
    /// Append a task and wake one worker
    pub fn submit(&self, task: Task) -> PoolResult<()> {
        {
            let mut state = self.shared.state.lock();
            if state.closed {
                return Err(PoolError::Stopped);
            }
            state.tasks.push_back(task);
            self.shared
                .stats
                .peak_len
                .fetch_max(state.tasks.len(), Ordering::Relaxed);
        }
        self.shared.stats.submitted.fetch_add(1, Ordering::Relaxed);
        self.shared.available.notify_one();
        Ok(())
    }
}

/// Handle for receiving tasks
#[derive(Clone)]
pub struct TaskReceiver {
    shared: Arc<Shared>,
}

impl TaskReceiver {
    /// Block until a task is available
    ///
    /// Returns `None` once the queue is stopping and empty.
    pub fn recv(&self) -> Option<Task> {
        let mut state = self.shared.state.lock();
        loop {
            if let Some(task) = state.tasks.pop_front() {
                self.shared.stats.dequeued.fetch_add(1, Ordering::Relaxed);
                return Some(task);
            }
            if state.stopping {
                return None;
            }
            self.shared.available.wait(&mut state);
        }
    }

    /// Take a task without blocking
    pub fn try_recv(&self) -> Option<Task> {
        let task = self.shared.state.lock().tasks.pop_front()?;
        self.shared.stats.dequeued.fetch_add(1, Ordering::Relaxed);
        Some(task)
    }
}
