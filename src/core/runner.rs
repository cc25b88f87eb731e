//! Application runner logic
//!
//! Handles the different ways to run fontgrab: the progress window,
//! a headless console run, and installing already-staged fonts.

use anyhow::Result;
use tracing::info;

use crate::core::cli::CliArgs;
use crate::core::config::FontCatalog;
use crate::core::settings::MAX_LISTED_FAILURES;
use crate::install::{platform_registrar, Installer};
use crate::worker::{self, RunSummary, WorkerMessage};

/// Create and run the application with the given CLI arguments.
/// Handles console modes and delegates the rest to the GUI.
pub fn run_app(cli_args: CliArgs) -> Result<()> {
    if cli_args.install_existing {
        let _log_guard = crate::logging::init_headless();
        cli_args
            .validate()
            .map_err(|e| anyhow::anyhow!("CLI validation failed: {}", e))?;
        let installer = Installer::new(platform_registrar());
        let summary = worker::install_existing(&cli_args.staging_dir(), &installer);
        print_summary(&summary, &cli_args);
        return Ok(());
    }

    if cli_args.headless {
        let _log_guard = crate::logging::init_headless();
        cli_args
            .validate()
            .map_err(|e| anyhow::anyhow!("CLI validation failed: {}", e))?;
        let summary = run_headless(&cli_args)?;
        print_summary(&summary, &cli_args);
        return Ok(());
    }

    let mut app = crate::core::app::create_app(cli_args)?;
    app.run();
    Ok(())
}

/// Full download-and-install pass without a window. The worker still
/// runs on its own thread and reports over the channel; the console
/// takes the place of the progress bar.
fn run_headless(cli_args: &CliArgs) -> Result<RunSummary> {
    let catalog = FontCatalog::load(cli_args.config.as_deref());
    let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
    let handle = worker::spawn(catalog, cli_args.staging_dir(), sender);

    while let Some(message) = receiver.blocking_recv() {
        match message {
            WorkerMessage::FamilyStarted {
                display_name,
                index,
                total,
            } => {
                println!("[{}/{}] Downloading {display_name}...", index + 1, total);
            }
            WorkerMessage::FamilyFinished {
                display_name,
                succeeded,
                ..
            } => {
                if succeeded {
                    println!("        {display_name} installed");
                } else {
                    println!("        {display_name} FAILED");
                }
            }
            WorkerMessage::RunFinished(_) => break,
        }
    }

    handle
        .join()
        .map_err(|_| anyhow::anyhow!("worker thread panicked"))
}

fn print_summary(summary: &RunSummary, cli_args: &CliArgs) {
    println!();
    println!(
        "Completed: {}/{} fonts installed successfully",
        summary.succeeded, summary.total
    );
    if !summary.failed.is_empty() {
        println!("Failed: {}", summary.failed_count());
        if summary.failed_count() <= MAX_LISTED_FAILURES {
            for failure in &summary.failed {
                println!("  {} ({})", failure.display_name, failure.error);
            }
        }
    }
    println!("Font files saved to: {}", cli_args.staging_dir().display());
    info!(
        succeeded = summary.succeeded,
        failed = summary.failed_count(),
        "run finished"
    );
}
