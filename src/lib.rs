//! dir-traverse - Parallel Directory Tree Walker
//!
//! Builds an in-memory mirror of a directory tree by enumerating every
//! directory as an independent task on a fixed pool of worker threads.
//!
//! # Features
//!
//! - **Task-per-directory**: Each subdirectory found becomes its own task,
//!   so wide and deep trees spread across all workers.
//!
//! - **Exact Termination**: A shared outstanding-task counter is raised
//!   before every submit and lowered when the task finishes; the walk is
//!   done only when it reaches zero.
//!
//! - **Lock-free Reads**: Each node is written once by the task that
//!   enumerates it and is immutable afterwards.
//!
//! - **Error Isolation**: A directory that cannot be listed is marked as
//!   failed without affecting its siblings.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       WalkCoordinator                            │
//! │        seed root task ─► wait(count == 0) ─► stop pool           │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Worker Pool                               │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐         ┌─────────┐     │
//! │  │walker-0 │  │walker-1 │  │walker-2 │  ...    │walker-N │     │
//! │  └────┬────┘  └────┬────┘  └────┬────┘         └────┬────┘     │
//! │       └────────────┼────────────┼────────────────────┘          │
//! │                    ▼            ▼                               │
//! │            ┌──────────────────────────┐                         │
//! │            │   Task Queue (FIFO)      │                         │
//! │            │  - unbounded             │                         │
//! │            │  - drained before stop   │                         │
//! │            └──────────────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//!                    ┌──────────────────┐
//!                    │ Arc<DirectoryNode>│
//!                    │   (tree mirror)   │
//!                    └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # Walk with one worker per CPU
//! dir-traverse /srv/data
//!
//! # Two workers, slowed down to watch the scheduling
//! dir-traverse -s /srv/data -t 2 -d 100ms
//! ```

pub mod config;
pub mod error;
pub mod progress;
pub mod tree;
pub mod walker;

pub use config::{CliArgs, WalkConfig};
pub use error::{Result, WalkerError};
pub use tree::{DirectoryNode, NodeState, TreeShape};
pub use walker::{WalkCoordinator, WalkProgress, WalkResult};
