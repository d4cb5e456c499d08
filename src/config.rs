//! Configuration types for dir-traverse
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation
//! - Debug delay parsing (`250ms`, `2s`)

use crate::error::ConfigError;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Maximum reasonable worker count
pub const MAX_WORKERS: usize = 512;

/// Parallel directory tree walker
#[derive(Parser, Debug, Clone)]
#[command(
    name = "dir-traverse",
    version,
    about = "Walk a directory tree in parallel and print its structure",
    long_about = "Enumerates a directory tree on a fixed pool of worker threads.\n\n\
                  Every subdirectory becomes its own task; the walk finishes once\n\
                  no task is queued or running anywhere in the pool.",
    after_help = "EXAMPLES:\n    \
        dir-traverse /srv/data\n    \
        dir-traverse -s /srv/data -t 8\n    \
        dir-traverse /srv/data -t 2 -d 50ms --dirs-only"
)]
pub struct CliArgs {
    /// Directory to walk
    #[arg(value_name = "ROOT")]
    pub root: Option<PathBuf>,

    /// Directory to walk (alternative to the positional argument)
    #[arg(short = 's', long = "source-path", value_name = "PATH", conflicts_with = "root")]
    pub source_path: Option<PathBuf>,

    /// Number of worker threads
    #[arg(
        short = 't',
        long = "thread-pool",
        visible_alias = "workers",
        default_value_t = default_workers(),
        value_name = "NUM"
    )]
    pub workers: usize,

    /// Pause after every task (e.g. 250ms, 2s); for observing scheduling
    #[arg(
        short = 'd',
        long = "debug-sleep",
        default_value = "0ms",
        value_parser = parse_delay,
        value_name = "DELAY"
    )]
    pub debug_sleep: Duration,

    /// Print directories only, without their files
    #[arg(long)]
    pub dirs_only: bool,

    /// Quiet mode - suppress progress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

fn default_workers() -> usize {
    num_cpus::get()
}

/// Parse a delay of the form `<integer><unit>` where unit is `ms` or `s`
///
/// Whitespace between the number and the unit is allowed.
pub fn parse_delay(value: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidDelay {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = value.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    if number.is_empty() {
        return Err(invalid("expected a non-negative integer followed by 'ms' or 's'"));
    }

    let amount: u64 = number.parse().map_err(|_| invalid("number out of range"))?;

    match unit.trim() {
        "ms" => Ok(Duration::from_millis(amount)),
        "s" => Ok(Duration::from_secs(amount)),
        "" => Err(invalid("missing time unit ('ms' or 's')")),
        other => Err(invalid(&format!("unknown time unit '{}'", other))),
    }
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct WalkConfig {
    /// Directory the walk starts from
    pub root: PathBuf,

    /// Number of worker threads
    pub worker_count: usize,

    /// Sleep after each task
    pub task_delay: Duration,

    /// Include files when rendering the tree
    pub show_files: bool,

    /// Show progress indicator
    pub show_progress: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl WalkConfig {
    /// Configuration for `root` with default settings
    ///
    /// Call [`WalkConfig::validate`] (the coordinator does) before walking.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            worker_count: default_workers(),
            task_delay: Duration::ZERO,
            show_files: true,
            show_progress: false,
            verbose: false,
        }
    }

    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_task_delay(mut self, delay: Duration) -> Self {
        self.task_delay = delay;
        self
    }

    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let root = args
            .source_path
            .or(args.root)
            .ok_or(ConfigError::MissingRoot)?;

        let config = Self {
            root,
            worker_count: args.workers,
            task_delay: args.debug_sleep,
            show_files: !args.dirs_only,
            show_progress: !args.quiet,
            verbose: args.verbose,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check worker count bounds and that the root is an existing directory
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 || self.worker_count > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: self.worker_count,
                max: MAX_WORKERS,
            });
        }

        if !self.root.exists() {
            return Err(ConfigError::RootNotFound {
                path: self.root.clone(),
            });
        }

        if !self.root.is_dir() {
            return Err(ConfigError::RootNotDirectory {
                path: self.root.clone(),
            });
        }

        Ok(())
    }
}
