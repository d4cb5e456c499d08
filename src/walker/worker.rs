//! Worker thread logic for the task pool
//!
//! Each worker:
//! - Blocks on the shared task queue until work arrives or the pool stops
//! - Runs one task at a time, catching task panics so the pool keeps serving
//! - Optionally sleeps after each task (debug throttling)
//! - Exits once the queue is stopping and drained

use crate::error::{PoolError, PoolResult};
use crate::walker::queue::TaskReceiver;
use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, trace};

/// Identifier of a worker thread within its pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub usize);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "walker-{}", self.0)
    }
}

thread_local! {
    static CURRENT_WORKER: Cell<Option<WorkerId>> = const { Cell::new(None) };
}

/// Id of the pool worker running the calling code, if any
pub fn current_worker() -> Option<WorkerId> {
    CURRENT_WORKER.with(|c| c.get())
}

/// Statistics collected by a worker
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Tasks that ran to completion
    pub tasks_run: AtomicU64,

    /// Tasks that panicked
    pub task_panics: AtomicU64,
}

impl WorkerStats {
    fn record_task(&self) {
        self.tasks_run.fetch_add(1, Ordering::Relaxed);
    }

    fn record_panic(&self) {
        self.task_panics.fetch_add(1, Ordering::Relaxed);
    }

    pub fn tasks_run(&self) -> u64 {
        self.tasks_run.load(Ordering::Relaxed)
    }

    pub fn task_panics(&self) -> u64 {
        self.task_panics.load(Ordering::Relaxed)
    }
}

/// A worker thread that executes queued tasks
pub struct Worker {
    /// Worker ID
    id: WorkerId,

    /// Thread handle
    handle: Option<JoinHandle<()>>,

    /// Worker statistics
    stats: Arc<WorkerStats>,
}

impl Worker {
    /// Spawn a new worker thread
    pub fn spawn(id: WorkerId, receiver: TaskReceiver, task_delay: Duration) -> PoolResult<Self> {
        let stats = Arc::new(WorkerStats::default());
        let stats_clone = Arc::clone(&stats);

        let handle = thread::Builder::new()
            .name(id.to_string())
            .spawn(move || worker_loop(id, receiver, task_delay, stats_clone))
            .map_err(|e| PoolError::SpawnFailed {
                id: id.0,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
            stats,
        })
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn stats(&self) -> &WorkerStats {
        &self.stats
    }

    /// Shared handle to the statistics, readable after [`Worker::join`]
    pub fn stats_handle(&self) -> Arc<WorkerStats> {
        Arc::clone(&self.stats)
    }

    /// Wait for the worker to finish
    pub fn join(mut self) -> PoolResult<()> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|payload| PoolError::Panicked {
                id: self.id.0,
                message: panic_message(payload.as_ref()),
            }),
            None => Ok(()),
        }
    }
}

/// Main worker loop
fn worker_loop(id: WorkerId, receiver: TaskReceiver, task_delay: Duration, stats: Arc<WorkerStats>) {
    CURRENT_WORKER.with(|c| c.set(Some(id)));
    debug!(worker = %id, "Worker starting");

    while let Some(task) = receiver.recv() {
        match panic::catch_unwind(AssertUnwindSafe(task)) {
            Ok(()) => {
                stats.record_task();
                trace!(worker = %id, "Task completed");
            }
            Err(payload) => {
                stats.record_panic();
                error!(
                    worker = %id,
                    message = %panic_message(payload.as_ref()),
                    "Task panicked"
                );
            }
        }

        if !task_delay.is_zero() {
            thread::sleep(task_delay);
        }
    }

    debug!(
        worker = %id,
        tasks = stats.tasks_run(),
        panics = stats.task_panics(),
        "Worker shutting down"
    );
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
