//! Parallel directory walker
//!
//! Every directory is enumerated by its own task on a fixed worker pool.
//! A task spawns one child task per subdirectory it finds, and the walk is
//! complete once the outstanding-task count reaches zero.
//!
//! # Architecture
//!
//! ```text
//!                     ┌─────────────────────────┐
//!                     │     WalkCoordinator     │
//!                     │  - seeds the root task  │
//!                     │  - waits for count == 0 │
//!                     └───────────┬─────────────┘
//!                                 │ spawn (count += 1)
//!                                 ▼
//!                     ┌─────────────────────────┐
//!                     │    TaskQueue (FIFO)     │◄──────────────┐
//!                     └───────────┬─────────────┘               │
//!                                 │                             │
//!       ┌─────────────────────────┼─────────────────────────┐   │
//!       │                         │                         │   │
//! ┌─────▼─────┐             ┌─────▼─────┐             ┌─────▼─────┐
//! │ walker-0  │             │ walker-1  │             │ walker-N  │
//! │ list dir  │             │ list dir  │             │ list dir  │
//! │ publish   │             │ publish   │             │ publish   │
//! └───────────┘             └───────────┘             └─────┬─────┘
//!                                                           │ child tasks
//!                                                           └──────────
//! ```

pub mod coordinator;
pub mod pool;
pub mod queue;
pub mod tracker;
pub mod walk;
pub mod worker;

pub use coordinator::{WalkCoordinator, WalkProgress, WalkResult};
pub use pool::{PoolReport, WorkerPool};
pub use queue::{Task, TaskQueue};
pub use tracker::{CompletionGuard, TaskScope, TaskTracker};
pub use walk::{DirLister, EntryKind, FsLister, ListedEntry, WalkStats};
pub use worker::{current_worker, WorkerId};
