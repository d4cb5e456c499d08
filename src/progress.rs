//! Progress reporting and output for the directory walker
//!
//! Provides a live spinner using indicatif, the styled header and summary,
//! and the plain-text rendering of the finished tree.

use crate::tree::{DirectoryNode, NodeState};
use crate::walker::{WalkProgress, WalkResult};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

/// Progress reporter that displays walk status
pub struct ProgressReporter {
    /// Progress bar
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        // Template is a literal; fall back to the default style rather than panic
        let spinner = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        bar.set_style(spinner);

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display
    pub fn update(&self, progress: &WalkProgress) {
        let msg = format!(
            "Dirs: {} | Files: {} | Errors: {} | Rate: {:.0} dirs/s | Pending: {} | Workers: {}",
            format_number(progress.dirs),
            format_number(progress.files),
            format_number(progress.errors),
            progress.dirs_per_second(),
            progress.outstanding,
            progress.total_workers,
        );

        self.bar.set_message(msg);
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish the progress display with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Write the walked tree, one directory per block
///
/// Each directory prints as `Directory: <path> (<worker>)`, followed by its
/// files indented one level. Children follow their parent, so the output is
/// a depth-first pre-order listing of the tree.
pub fn render_tree<W: Write>(out: &mut W, root: &DirectoryNode, show_files: bool) -> io::Result<()> {
    for node in root.iter() {
        let indent = "  ".repeat(node.depth() as usize);
        let owner = node
            .discovered_by()
            .map(|w| w.to_string())
            .unwrap_or_else(|| "main".to_string());

        match node.state() {
            NodeState::Populated => {
                writeln!(out, "{}Directory: {} ({})", indent, node.path().display(), owner)?;
                if show_files {
                    for file in node.files() {
                        writeln!(out, "{}  {}", indent, file.display())?;
                    }
                }
            }
            NodeState::Failed => {
                let reason = node.error().map(|e| e.to_string()).unwrap_or_default();
                writeln!(
                    out,
                    "{}Directory: {} ({}) [error: {}]",
                    indent,
                    node.path().display(),
                    owner,
                    reason
                )?;
            }
            NodeState::Pending => {
                writeln!(out, "{}Directory: {} [pending]", indent, node.path().display())?;
            }
        }
    }

    out.flush()
}

/// Print a summary of the walk results
pub fn print_summary(result: &WalkResult) {
    let duration_secs = result.duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        result.total_dirs as f64 / duration_secs
    } else {
        0.0
    };

    println!();
    println!("{}", style("Walk Complete").green().bold());
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {}",
        style("Directories:").bold(),
        format_number(result.total_dirs)
    );
    println!(
        "  {} {}",
        style("Files:").bold(),
        format_number(result.total_files)
    );
    if result.special_files > 0 {
        println!(
            "  {} {}",
            style("Special:").bold(),
            format_number(result.special_files)
        );
    }
    println!(
        "  {} {:.3}s ({:.0} dirs/sec)",
        style("Duration:").bold(),
        duration_secs,
        rate
    );
    println!(
        "  {} {}",
        style("Started:").bold(),
        result.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if result.errors > 0 {
        println!(
            "  {} {}",
            style("Errors:").yellow().bold(),
            format_number(result.errors)
        );
    }
    if result.pool.task_panics > 0 {
        println!(
            "  {} {}",
            style("Task panics:").red().bold(),
            format_number(result.pool.task_panics)
        );
    }

    println!("  {}", style("Tasks per worker:").bold());
    for (worker, tasks) in &result.pool.tasks_per_worker {
        println!("    {:<12} {}", worker.to_string(), format_number(*tasks));
    }
    println!();
}

/// Print a header at the start of the walk
pub fn print_header(root: &Path, workers: usize, task_delay: Duration) {
    println!();
    println!(
        "{} {}",
        style("dir-traverse").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Source:").bold(), root.display());
    println!("  {} {}", style("Workers:").bold(), workers);
    if !task_delay.is_zero() {
        println!("  {} {:?} per task", style("Delay:").bold(), task_delay);
    }
    println!();
}
