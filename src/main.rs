//! dir-traverse - Parallel Directory Tree Walker
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use dir_traverse::config::{CliArgs, WalkConfig};
use dir_traverse::progress::{print_header, print_summary, render_tree, ProgressReporter};
use dir_traverse::walker::WalkCoordinator;
use std::io::{self, BufWriter};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse();

    setup_logging(args.verbose)?;

    let config = WalkConfig::from_args(args).context("Invalid configuration")?;

    if config.show_progress {
        print_header(&config.root, config.worker_count, config.task_delay);
    }

    let coordinator = WalkCoordinator::new(config.clone()).context("Failed to initialize walker")?;

    let result = if config.show_progress {
        let progress = Arc::new(ProgressReporter::new());
        progress.set_status("Walking...");

        let reporter = Arc::clone(&progress);
        let result = coordinator
            .run_with_progress(move |p| reporter.update(&p))
            .context("Walk failed");

        progress.finish_and_clear();
        result?
    } else {
        coordinator.run().context("Walk failed")?
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    render_tree(&mut out, &result.root, config.show_files).context("Failed to write tree")?;
    drop(out);

    if config.show_progress {
        print_summary(&result);
    }

    if result.errors > 0 {
        info!(errors = result.errors, "Walk completed with errors");
    }

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("dir_traverse=debug,warn")
    } else {
        EnvFilter::new("dir_traverse=info,warn")
    };

    // Logs go to stderr so stdout carries only the tree
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_names(true)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
