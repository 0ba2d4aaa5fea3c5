//! Human-readable and JSON rendering of comparisons and sync reports

use std::fmt::Write as _;

use colored::{ColoredString, Colorize};
use dirsync_core::{
    ActionCategory, DiffResult, DiffSource, Outcome, Side, SyncAction, SyncReport,
};
use serde_json::{Value, json};

/// Render a comparison, section by section.
pub fn render_diff(diff: &DiffResult) -> String {
    let mut out = String::new();

    if diff.is_empty() {
        let _ = writeln!(out, "{}", "No differences found!".green().bold());
    } else {
        if !diff.content_diffs.is_empty() {
            section(&mut out, "Contents different", diff.content_diffs.len());
            for pair in &diff.content_diffs {
                let hint = match pair.larger_side() {
                    Some(side) => format!("bigger in {side}"),
                    None => "same size".to_string(),
                };
                let _ = writeln!(
                    out,
                    "  {} {} ({})",
                    "~".yellow(),
                    diff.relative(Side::Left, &pair.left),
                    hint.dimmed()
                );
            }
        }
        for side in [Side::Left, Side::Right] {
            let entries = diff.only(side);
            if entries.is_empty() {
                continue;
            }
            section(&mut out, &format!("Only in {side}"), entries.len());
            for entry in entries {
                let marker = if entry.is_dir() { "/" } else { "" };
                let _ = writeln!(out, "  {} {}{marker}", "*".cyan(), diff.relative(side, entry));
            }
        }
    }

    if !diff.errors.is_empty() {
        section(&mut out, "Warnings", diff.errors.len());
        for issue in &diff.errors {
            let _ = writeln!(out, "  {} {}", "!".red(), issue.message);
        }
    }
    out
}

/// Render a sync report, one section per category that has actions.
pub fn render_sync(report: &SyncReport) -> String {
    let mut out = String::new();
    let header = if report.dry_run {
        "Sync plan (dry-run, nothing was changed)".yellow().bold()
    } else {
        "Sync".blue().bold()
    };
    let _ = writeln!(out, "{header}");

    if report.is_empty() && !report.cancelled {
        let _ = writeln!(out, "  Nothing to do.");
    }

    for category in ActionCategory::ALL {
        let counts = report.counts(category);
        if counts.total() == 0 {
            continue;
        }
        section(&mut out, &category_title(category, report.dry_run), counts.total());
        for action in report.actions_in(category) {
            let _ = writeln!(out, "  {} {}", marker(action), line(action));
        }
        if !report.dry_run {
            let _ = writeln!(
                out,
                "  {} executed, {} skipped, {} failed",
                counts.executed, counts.skipped, counts.failed
            );
        }
    }

    if report.cancelled {
        let _ = writeln!(
            out,
            "\n{} remaining actions were not attempted",
            "Cancelled:".red().bold()
        );
    }
    out
}

/// JSON document for `--json`.
pub fn to_json(diff: &DiffResult, source: DiffSource, sync: Option<&SyncReport>) -> Value {
    let source = match source {
        DiffSource::Cache => "cache",
        DiffSource::Walk => "walk",
    };
    json!({
        "source": source,
        "diff": diff,
        "sync": sync,
    })
}

fn section(out: &mut String, title: &str, count: usize) {
    let _ = writeln!(out, "\n{}", format!("{title} ({count})").bold());
}

fn category_title(category: ActionCategory, dry_run: bool) -> String {
    if !dry_run {
        return category.title().to_string();
    }
    match category {
        ActionCategory::Remove => "Will be removed",
        ActionCategory::Add => "Will be copied",
        ActionCategory::Overwrite => "Will be overwritten",
    }
    .to_string()
}

fn marker(action: &SyncAction) -> ColoredString {
    match action.category {
        ActionCategory::Remove => "-".red(),
        ActionCategory::Add => "+".green(),
        ActionCategory::Overwrite => "~".yellow(),
    }
}

fn line(action: &SyncAction) -> ColoredString {
    let text = action.to_string();
    match action.outcome {
        Outcome::Failed { .. } => text.red(),
        Outcome::Skipped { .. } => text.dimmed(),
        Outcome::Planned | Outcome::Executed => text.normal(),
    }
}
