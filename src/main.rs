use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use pyrelease::cli::{run_release_workflow, run_release_workflow_reporting, ReleaseWorkflowArgs};
use pyrelease::domain::{EventKind, VersionBump};
use pyrelease::ui;
use pyrelease::ReleaseError;

#[derive(clap::Parser)]
#[command(
    name = "pyrelease",
    version,
    about = "Bump, document, build and publish a Python package release"
)]
struct Args {
    #[arg(
        short,
        long,
        value_enum,
        env = "VERSION_NAME",
        default_value_t = VersionBump::Patch,
        help = "Semantic version component to bump"
    )]
    bump: VersionBump,

    #[arg(
        short,
        long,
        value_enum,
        env = "GITHUB_EVENT_NAME",
        default_value_t = EventKind::WorkflowDispatch,
        help = "Event that triggered the run; pull_request always dry-runs"
    )]
    event: EventKind,

    #[arg(long, help = "Preview the release without committing, tagging or publishing")]
    dry_run: bool,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(short = 'C', long, help = "Repository directory (defaults to the current directory)")]
    workdir: Option<PathBuf>,

    #[arg(long, help = "Print the release report as JSON")]
    json: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        if let Some(err) = e.downcast_ref::<ReleaseError>() {
            log::error!("Release failed ({:?})", err.kind());
        }
        ui::display_error(&error_message(&e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let workflow = ReleaseWorkflowArgs {
        config_path: args.config,
        workdir: args.workdir,
        bump: args.bump,
        event: args.event,
        dry_run: args.dry_run,
    };

    if !args.json {
        let report = run_release_workflow(&workflow)?;
        ui::display_report(&report);
        return Ok(());
    }

    // stdout carries only the report; it is printed after failures too
    ui::send_progress_to_stderr();
    let (report, outcome) = run_release_workflow_reporting(&workflow)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    outcome?;
    Ok(())
}

/// Join the error chain, skipping causes an outer message already shows
fn error_message(err: &anyhow::Error) -> String {
    let mut message = err.to_string();
    for cause in err.chain().skip(1) {
        let cause = cause.to_string();
        if !message.contains(&cause) {
            message = format!("{}: {}", message, cause);
        }
    }
    message
}
