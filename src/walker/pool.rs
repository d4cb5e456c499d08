//! Fixed-size worker pool
//!
//! The pool is an explicit object: the caller starts it with a worker count,
//! hands [`TaskScope`]s to whatever needs to spawn work, and stops it once the
//! [`TaskTracker`] reports that nothing is outstanding.

use crate::error::{PoolError, PoolResult};
use crate::walker::queue::{QueueStats, TaskQueue, TaskSender};
use crate::walker::tracker::{TaskScope, TaskTracker};
use crate::walker::worker::{Worker, WorkerId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Per-worker task counts after the pool stopped
#[derive(Debug, Clone, Default)]
pub struct PoolReport {
    /// (worker, tasks run) in worker order
    pub tasks_per_worker: Vec<(WorkerId, u64)>,

    /// Tasks that panicked
    pub task_panics: u64,

    /// Tasks ever submitted
    pub submitted: u64,

    /// Highest queue length observed
    pub peak_queue_len: usize,
}

impl PoolReport {
    pub fn total_tasks(&self) -> u64 {
        self.tasks_per_worker.iter().map(|(_, n)| n).sum()
    }
}

/// A fixed set of worker threads consuming one FIFO queue
pub struct WorkerPool {
    queue: TaskQueue,
    workers: Vec<Worker>,
    worker_count: usize,
}

impl WorkerPool {
    /// Spawn `worker_count` workers, each sleeping `task_delay` after a task
    pub fn start(worker_count: usize, task_delay: Duration) -> PoolResult<Self> {
        if worker_count == 0 {
            return Err(PoolError::NoWorkers);
        }

        let mut pool = Self {
            queue: TaskQueue::new(),
            workers: Vec::with_capacity(worker_count),
            worker_count,
        };

        for id in 0..worker_count {
            match Worker::spawn(WorkerId(id), pool.queue.receiver(), task_delay) {
                Ok(worker) => pool.workers.push(worker),
                Err(e) => {
                    error!(worker = id, error = %e, "Failed to spawn worker");
                    // Already-spawned workers are stopped by Drop
                    return Err(e);
                }
            }
        }

        info!(
            workers = worker_count,
            delay_ms = task_delay.as_millis() as u64,
            "Worker pool started"
        );
        Ok(pool)
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Raw submission handle (untracked)
    pub fn sender(&self) -> TaskSender {
        self.queue.sender()
    }

    /// Spawn handle whose tasks are counted by `tracker`
    pub fn scope(&self, tracker: Arc<TaskTracker>) -> TaskScope {
        TaskScope::new(self.queue.sender(), tracker)
    }

    /// Submit an untracked task
    pub fn submit<F>(&self, task: F) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.queue.sender().submit(Box::new(task))
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn queue_stats(&self) -> &QueueStats {
        self.queue.stats()
    }

    /// Stop once `tracker` shows no outstanding work
    ///
    /// Stopping while tasks are still outstanding is a lifecycle error: those
    /// tasks may yet spawn children into a pool that is going away. The pool
    /// is left running in that case.
    pub fn shutdown(&mut self, tracker: &TaskTracker) -> PoolResult<PoolReport> {
        let count = tracker.outstanding();
        if count > 0 {
            error!(outstanding = count, "Worker pool stop requested with work outstanding");
            return Err(PoolError::OutstandingWork { count });
        }
        self.stop()
    }

    /// Drain the queue, join every worker, then reject further submissions
    pub fn stop(&mut self) -> PoolResult<PoolReport> {
        self.queue.begin_stop();

        let mut report = PoolReport::default();
        let mut first_error = None;

        for worker in std::mem::take(&mut self.workers) {
            let id = worker.id();
            let stats = worker.stats_handle();
            if let Err(e) = worker.join() {
                error!(worker = %id, error = %e, "Worker failed to join cleanly");
                first_error.get_or_insert(e);
            }
            report.tasks_per_worker.push((id, stats.tasks_run()));
            report.task_panics += stats.task_panics();
        }

        let abandoned = self.queue.close();
        report.submitted = self.queue.stats().submitted();
        report.peak_queue_len = self.queue.stats().peak_len();

        if let Some(e) = first_error {
            return Err(e);
        }
        if abandoned > 0 {
            error!(count = abandoned, "Queued tasks abandoned at shutdown");
            return Err(PoolError::Abandoned { count: abandoned });
        }

        debug!(
            tasks = report.total_tasks(),
            submitted = report.submitted,
            "Worker pool stopped"
        );
        Ok(report)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        self.queue.begin_stop();
        for worker in std::mem::take(&mut self.workers) {
            let _ = worker.join();
        }
        self.queue.close();
    }
}
