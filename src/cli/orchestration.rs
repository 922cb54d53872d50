//! Main workflow orchestration logic
//!
//! Wires the real git repository, process runner and GitHub client into a
//! [`Pipeline`]. Kept apart from `main.rs` so the workflow can be driven
//! without clap.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::{self, Config};
use crate::domain::{EventKind, Trigger, VersionBump};
use crate::git::Git2Repository;
use crate::github::GitHubClient;
use crate::pipeline::{Credentials, Pipeline, ReleaseReport};
use crate::runner::SystemRunner;

/// Environment variable GitHub Actions sets to `owner/name`
pub const GITHUB_REPOSITORY_ENV: &str = "GITHUB_REPOSITORY";

/// Environment file GitHub Actions reads exported variables from
pub const GITHUB_ENV_FILE: &str = "GITHUB_ENV";

/// Arguments for the release workflow
///
/// Mirrors the CLI Args but in a format suitable for orchestration logic.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseWorkflowArgs {
    /// Path to custom config file
    pub config_path: Option<PathBuf>,

    /// Repository working directory; the current directory when unset
    pub workdir: Option<PathBuf>,

    pub bump: VersionBump,

    pub event: EventKind,

    /// Force dry-run mode on a dispatch
    pub dry_run: bool,
}

impl ReleaseWorkflowArgs {
    pub fn trigger(&self) -> Trigger {
        Trigger::from_event(self.event, self.bump, self.dry_run)
    }
}

/// Fill settings the CI environment provides and the config left unset
pub fn apply_ci_environment(config: &mut Config) {
    if config.github.repository.is_none() {
        if let Ok(slug) = std::env::var(GITHUB_REPOSITORY_ENV) {
            if !slug.trim().is_empty() {
                log::debug!("Using {} from {}", slug, GITHUB_REPOSITORY_ENV);
                config.github.repository = Some(slug);
            }
        }
    }
}

/// Main release workflow
///
/// 1. Load configuration
/// 2. Open the repository and resolve credentials
/// 3. Run the pipeline for the trigger
pub fn run_release_workflow(args: &ReleaseWorkflowArgs) -> Result<ReleaseReport> {
    let (report, outcome) = run_release_workflow_reporting(args)?;
    outcome?;
    Ok(report)
}

/// Like [`run_release_workflow`], but a failing pipeline step still yields
/// the report (stage `Failed`) next to the step error.
///
/// The outer error covers setup only: config, repository and HTTP client.
pub fn run_release_workflow_reporting(
    args: &ReleaseWorkflowArgs,
) -> Result<(ReleaseReport, crate::Result<()>)> {
    let workdir = match args.workdir {
        Some(ref dir) => dir.clone(),
        None => std::env::current_dir().context("Cannot determine the current directory")?,
    };

    let mut config = config::load_config(args.config_path.as_deref(), &workdir)
        .context("Error loading config")?;
    apply_ci_environment(&mut config);

    let mut repo = Git2Repository::open(&workdir)
        .with_context(|| format!("No git repository at {}", workdir.display()))?;
    if let (Some(name), Some(email)) = (&config.git.author_name, &config.git.author_email) {
        repo = repo.with_author(name.as_str(), email.as_str());
    }

    let runner = SystemRunner::new();
    let host = GitHubClient::new(config.github.api_url.as_str())?;
    let credentials = Credentials::from_env(&config);
    let env_file = std::env::var_os(GITHUB_ENV_FILE).map(PathBuf::from);

    let trigger = args.trigger();
    log::info!("Starting release: {:?}", trigger);

    Ok(Pipeline::new(&config, &repo, &runner, &host, credentials)
        .with_env_file(env_file)
        .run_reporting(trigger))
}
