//! Error types for dir-traverse
//!
//! This module defines the error hierarchy for:
//! - Configuration and CLI errors
//! - Worker pool lifecycle errors
//! - Per-directory enumeration errors
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Enumeration errors are local to one directory and stored on the node
//! - Lifecycle misuse is always returned as an error, never swallowed

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level error type for the walker
#[derive(Error, Debug)]
pub enum WalkerError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Worker pool errors
    #[error("Worker pool error: {0}")]
    Pool(#[from] PoolError),

    /// I/O errors (rendering, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration and CLI errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Root path is missing
    #[error("Root path is required")]
    MissingRoot,

    /// Root path does not exist
    #[error("Source path does not exist: '{path}'")]
    RootNotFound { path: PathBuf },

    /// Root path is not a directory
    #[error("Source path is not a directory: '{path}'")]
    RootNotDirectory { path: PathBuf },

    /// Delay could not be parsed
    #[error("Invalid delay '{value}': {reason}")]
    InvalidDelay { value: String, reason: String },
}

/// Worker pool lifecycle errors
#[derive(Error, Debug)]
pub enum PoolError {
    /// Pool started without workers; nothing would ever run
    #[error("Worker pool needs at least one worker")]
    NoWorkers,

    /// Submission after the pool has fully stopped
    #[error("Task submitted after the worker pool stopped")]
    Stopped,

    /// Shutdown requested while tracked tasks are still outstanding
    #[error("Cannot stop worker pool: {count} tasks still outstanding")]
    OutstandingWork { count: usize },

    /// Tasks left in the queue after every worker exited
    #[error("{count} queued tasks were never run: all workers had exited")]
    Abandoned { count: usize },

    /// Worker thread could not be spawned
    #[error("Failed to spawn worker {id}: {reason}")]
    SpawnFailed { id: usize, reason: String },

    /// Worker thread panicked outside of a task
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },
}

/// Failure to enumerate a single directory
///
/// Stored on the node that failed; it never aborts sibling or ancestor tasks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnumerationError {
    /// Permission denied
    #[error("Permission denied: '{path}'")]
    PermissionDenied { path: PathBuf },

    /// Directory disappeared during the walk
    #[error("Path not found: '{path}'")]
    NotFound { path: PathBuf },

    /// Any other listing failure
    #[error("Failed to read directory '{path}': {reason}")]
    ReadDirFailed { path: PathBuf, reason: String },

    /// Task for this directory could not be submitted
    #[error("Directory '{path}' was never scheduled: {reason}")]
    Unscheduled { path: PathBuf, reason: String },
}

impl EnumerationError {
    /// Classify an I/O error raised while listing `path`
    pub fn from_io(path: &Path, err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => EnumerationError::PermissionDenied {
                path: path.to_path_buf(),
            },
            io::ErrorKind::NotFound => EnumerationError::NotFound {
                path: path.to_path_buf(),
            },
            _ => EnumerationError::ReadDirFailed {
                path: path.to_path_buf(),
                reason: err.to_string(),
            },
        }
    }

    /// Returns the path associated with this error
    pub fn path(&self) -> &Path {
        match self {
            EnumerationError::PermissionDenied { path } => path,
            EnumerationError::NotFound { path } => path,
            EnumerationError::ReadDirFailed { path, .. } => path,
            EnumerationError::Unscheduled { path, .. } => path,
        }
    }

    /// Not-found is routine on a live filesystem and is logged quietly
    pub fn is_vanished(&self) -> bool {
        matches!(self, EnumerationError::NotFound { .. })
    }
}

/// Result type alias for WalkerError
pub type Result<T> = std::result::Result<T, WalkerError>;

/// Result type alias for PoolError
pub type PoolResult<T> = std::result::Result<T, PoolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumeration_error_classification() {
        let path = Path::new("/data/locked");

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(
            EnumerationError::from_io(path, &denied),
            EnumerationError::PermissionDenied {
                path: path.to_path_buf()
            }
        );

        let gone = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err = EnumerationError::from_io(path, &gone);
        assert!(err.is_vanished());
        assert_eq!(err.path(), path);

        let other = io::Error::new(io::ErrorKind::Other, "disk on fire");
        match EnumerationError::from_io(path, &other) {
            EnumerationError::ReadDirFailed { reason, .. } => assert!(reason.contains("disk on fire")),
            e => panic!("unexpected classification: {e:?}"),
        }
    }

    #[test]
    fn test_error_conversion() {
        let pool_err = PoolError::OutstandingWork { count: 3 };
        let walker_err: WalkerError = pool_err.into();
        assert!(matches!(walker_err, WalkerError::Pool(_)));

        let config_err = ConfigError::InvalidWorkerCount { count: 0, max: 512 };
        let walker_err: WalkerError = config_err.into();
        assert!(walker_err.to_string().contains("between 1 and 512"));
    }
}
