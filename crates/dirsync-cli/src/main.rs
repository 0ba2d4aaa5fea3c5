//! dirsync CLI
//!
//! Compares two directory trees and, when asked, synchronizes them.

mod cli;
mod error;
mod logging;
mod progress_bar;
mod report;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use dirsync_core::{
    CancelToken, FileDiffCache, NoProgress, Progress, Settings, SyncReport, SyncSession,
};

use cli::Cli;
use error::{CliError, Result};
use progress_bar::TerminalProgress;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)
        .map_err(|e| CliError::user(format!("Failed to set up logging: {e}")))?;

    let settings = load_settings(&cli)?;
    let policy = cli.policy();
    let progress: Arc<dyn Progress> = if cli.hide_progress_bar {
        Arc::new(NoProgress)
    } else {
        Arc::new(TerminalProgress::new())
    };
    let cancel = match cli.timeout {
        Some(secs) => CancelToken::with_timeout(Duration::from_secs(secs)),
        None => CancelToken::new(),
    };

    let cache = FileDiffCache::from_settings(&settings);
    tracing::debug!(cache = %cache.dir().display(), "Using cache directory");
    let session = SyncSession::new(&cli.left, &cli.right)?
        .with_settings(settings)
        .with_cache(Arc::new(cache))
        .with_progress(progress)
        .with_cancel(cancel)
        .count_total(!cli.hide_progress_bar);

    let (diff, source) = session.load_or_compare(cli.use_cache)?;
    if !cli.json {
        print!("{}", report::render_diff(&diff));
    }

    let sync_report = if policy.has_work() && !diff.is_empty() {
        let sync_report = session.sync(&diff, &policy);
        if !cli.json {
            println!();
            print!("{}", report::render_sync(&sync_report));
        }
        Some(sync_report)
    } else {
        None
    };

    if cli.json {
        let document = report::to_json(&diff, source, sync_report.as_ref());
        println!("{}", serde_json::to_string_pretty(&document)?);
    }

    match sync_report {
        Some(sync_report) => check_outcome(&sync_report),
        None => Ok(()),
    }
}

/// Settings file first, then command-line overrides.
fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::discover(cli.config.as_deref())?;
    if let Some(dir) = &cli.cache_dir {
        settings.cache_dir = Some(dir.clone());
    }
    if let Some(dir) = &cli.trash_dir {
        settings.trash_dir = Some(dir.clone());
    }
    Ok(settings)
}

fn check_outcome(report: &SyncReport) -> Result<()> {
    let failed = report.failures().count();
    if failed > 0 {
        return Err(CliError::user(format!("{failed} sync action(s) failed")));
    }
    if report.cancelled {
        return Err(CliError::user("sync stopped before all actions were attempted"));
    }
    Ok(())
}
