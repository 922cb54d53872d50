//! Formatting functions for terminal output.
//!
//! Progress goes to stdout unless [`send_progress_to_stderr`] was called,
//! which keeps stdout free for machine-readable output. Errors and warnings
//! always go to stderr. Colours come from `console`, which drops them when
//! the stream is not a terminal.

use console::style;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::boundary::BoundaryWarning;
use crate::bump::BumpPlan;
use crate::pipeline::{ReleaseReport, Step};

static PROGRESS_TO_STDERR: AtomicBool = AtomicBool::new(false);

/// Route all progress output to stderr for the rest of the process.
pub fn send_progress_to_stderr() {
    PROGRESS_TO_STDERR.store(true, Ordering::Relaxed);
}

fn progress(line: String) {
    if PROGRESS_TO_STDERR.load(Ordering::Relaxed) {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    progress(format!("{} {}", style("✓").green(), message));
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    progress(format!("{} {}", style("→").yellow(), message));
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    log::debug!("Boundary warning: {:?}", warning);
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

pub fn display_step_started(step: Step) {
    log::info!("Running step {}", step);
    progress(style(format!("[{}]", step)).bold().to_string());
}

pub fn display_step_skipped(step: Step) {
    log::debug!("Skipping step {} in dry run", step);
    progress(style(format!("[{}] skipped (dry run)", step)).dim().to_string());
}

/// Display the computed version change.
///
/// In a dry run this is the only output that matters: the version the
/// real run would produce.
pub fn display_version_plan(plan: &BumpPlan, dry_run: bool) {
    let heading = if dry_run {
        "Version (dry run):"
    } else {
        "Version:"
    };
    progress(format!("\n{}", style(heading).bold()));
    progress(format!("  From: {}", style(plan.current).red()));
    progress(format!("  To:   {}", style(plan.next).green()));
    progress(format!("  Tag:  {}", style(&plan.tag).cyan()));
    for file in &plan.files {
        progress(format!("  - {}", file.display()));
    }
}

/// One-paragraph summary printed after a successful run
pub fn format_report(report: &ReleaseReport) -> String {
    let mut lines = Vec::new();

    match (&report.version, &report.tag) {
        (Some(version), Some(tag)) if report.dry_run => lines.push(format!(
            "Dry run complete: next release would be {} ({})",
            version, tag
        )),
        (Some(version), Some(tag)) => lines.push(format!("Released {} ({})", version, tag)),
        _ => lines.push("Release run complete".to_string()),
    }

    lines.push(format!("Stage: {}", report.stage));
    if !report.skipped.is_empty() {
        let skipped: Vec<&str> = report.skipped.iter().map(|s| s.name()).collect();
        lines.push(format!("Skipped: {}", skipped.join(", ")));
    }
    if let Some(ref dists) = report.artifacts {
        lines.push(format!("sdist: {}", dists.sdist.display()));
        lines.push(format!("wheel: {}", dists.wheel.display()));
    }
    if let Some(ref url) = report.release_url {
        lines.push(format!("Release: {}", url));
    }
    if !report.warnings.is_empty() {
        lines.push(format!("Warnings: {}", report.warnings.len()));
    }

    lines.join("\n")
}

pub fn display_report(report: &ReleaseReport) {
    println!("\n{} {}", style("✓").green().bold(), format_report(report));
}
