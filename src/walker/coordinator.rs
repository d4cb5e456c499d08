//! Walk coordinator - drives one parallel directory walk
//!
//! The coordinator is responsible for:
//! - Starting the worker pool
//! - Seeding the root task
//! - Waiting until no task is outstanding anywhere in the task graph
//! - Stopping the pool and collecting final statistics

use crate::config::WalkConfig;
use crate::error::Result;
use crate::tree::DirectoryNode;
use crate::walker::pool::{PoolReport, WorkerPool};
use crate::walker::tracker::TaskTracker;
use crate::walker::walk::{DirLister, FsLister, WalkContext, WalkStats};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Result of a completed walk
#[derive(Debug)]
pub struct WalkResult {
    /// Fully populated tree
    pub root: Arc<DirectoryNode>,

    /// Directories enumerated successfully
    pub total_dirs: u64,

    /// Entries recorded as files (including symlinks and special files)
    pub total_files: u64,

    /// Symlinks and special files among `total_files`
    pub special_files: u64,

    /// Directories that could not be enumerated
    pub errors: u64,

    /// Number of worker threads
    pub worker_count: usize,

    /// Per-worker task counts
    pub pool: PoolReport,

    /// Wall-clock start
    pub started_at: DateTime<Utc>,

    /// Time taken for the walk
    pub duration: Duration,
}

/// Progress information for display
#[derive(Debug, Clone, Default)]
pub struct WalkProgress {
    /// Directories enumerated
    pub dirs: u64,

    /// Files recorded
    pub files: u64,

    /// Enumeration errors
    pub errors: u64,

    /// Tasks spawned but not yet completed
    pub outstanding: usize,

    /// Total workers
    pub total_workers: usize,

    /// Elapsed time
    pub elapsed: Duration,
}

impl WalkProgress {
    /// Calculate dirs per second rate
    pub fn dirs_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.dirs as f64 / secs
        } else {
            0.0
        }
    }
}

/// Coordinates one parallel directory walk
pub struct WalkCoordinator {
    /// Validated configuration
    config: WalkConfig,

    /// Where directory listings come from
    lister: Arc<dyn DirLister>,

    /// Outstanding-task counter for this walk
    tracker: Arc<TaskTracker>,

    /// Shared counters
    stats: Arc<WalkStats>,
}

impl WalkCoordinator {
    /// Create a coordinator that reads the real filesystem
    pub fn new(config: WalkConfig) -> Result<Self> {
        Self::with_lister(config, Arc::new(FsLister))
    }

    /// Create a coordinator with a custom listing source
    pub fn with_lister(config: WalkConfig, lister: Arc<dyn DirLister>) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            lister,
            tracker: Arc::new(TaskTracker::new()),
            stats: Arc::new(WalkStats::default()),
        })
    }

    /// Outstanding-task counter, for external watchdogs
    pub fn tracker(&self) -> Arc<TaskTracker> {
        Arc::clone(&self.tracker)
    }

    /// Snapshot of the walk so far
    pub fn progress(&self, elapsed: Duration) -> WalkProgress {
        snapshot(&self.stats, &self.tracker, self.config.worker_count, elapsed)
    }

    /// Run the walk to completion
    pub fn run(self) -> Result<WalkResult> {
        let start = Instant::now();
        let started_at = Utc::now();

        info!(
            root = %self.config.root.display(),
            workers = self.config.worker_count,
            "Starting directory walk"
        );

        let mut pool = WorkerPool::start(self.config.worker_count, self.config.task_delay)?;

        let root = DirectoryNode::root(self.config.root.clone());
        let ctx = WalkContext::new(
            pool.scope(Arc::clone(&self.tracker)),
            Arc::clone(&self.lister),
            Arc::clone(&self.stats),
        );
        ctx.spawn_node(Arc::clone(&root))?;

        // Only a zero count means every node is published
        self.tracker.wait();
        debug!("No outstanding tasks, stopping pool");

        let report = pool.shutdown(&self.tracker)?;
        let duration = start.elapsed();

        info!(
            dirs = self.stats.dirs(),
            files = self.stats.files(),
            errors = self.stats.errors(),
            duration_ms = duration.as_millis() as u64,
            "Walk completed"
        );

        Ok(WalkResult {
            root,
            total_dirs: self.stats.dirs(),
            total_files: self.stats.files(),
            special_files: self.stats.special(),
            errors: self.stats.errors(),
            worker_count: self.config.worker_count,
            pool: report,
            started_at,
            duration,
        })
    }

    /// Run the walk, reporting progress every 100ms from a separate thread
    pub fn run_with_progress<F>(self, progress_callback: F) -> Result<WalkResult>
    where
        F: Fn(WalkProgress) + Send + 'static,
    {
        let start = Instant::now();
        let done = Arc::new(AtomicBool::new(false));
        let stats = Arc::clone(&self.stats);
        let tracker = Arc::clone(&self.tracker);
        let total_workers = self.config.worker_count;

        let progress_handle = {
            let done = Arc::clone(&done);
            thread::Builder::new()
                .name("progress".to_string())
                .spawn(move || {
                    while !done.load(Ordering::Relaxed) {
                        progress_callback(snapshot(&stats, &tracker, total_workers, start.elapsed()));
                        thread::sleep(Duration::from_millis(100));
                    }
                })?
        };

        let result = self.run();

        done.store(true, Ordering::SeqCst);
        let _ = progress_handle.join();

        result
    }
}

fn snapshot(stats: &WalkStats, tracker: &TaskTracker, total_workers: usize, elapsed: Duration) -> WalkProgress {
    WalkProgress {
        dirs: stats.dirs(),
        files: stats.files(),
        errors: stats.errors(),
        outstanding: tracker.outstanding(),
        total_workers,
        elapsed,
    }
}
