//! The release pipeline: an ordered list of fallible steps
//!
//! Each step either succeeds and may advance the [Stage], or fails and
//! stops the run. A single dry-run flag, taken from the [Trigger], decides
//! which steps run at all: in dry-run mode nothing is committed, tagged,
//! pushed, published or released.
//!
//! Nothing is rolled back on failure. The error names the failing step and
//! the last stage reached, which is enough to finish a release by hand.

pub mod stage;

pub use stage::{Stage, Step};

use crate::artifacts::{self, Distributions};
use crate::boundary::BoundaryWarning;
use crate::bump::{BumpPlan, VersionResolver};
use crate::config::Config;
use crate::domain::{latest_release_tag, Trigger, Version, VersionBump};
use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use crate::github::{ReleaseHost, ReleaseRequest, RepoSlug};
use crate::lint;
use crate::notes::{self, ReleaseNotes};
use crate::runner::{env_file, CommandRunner, StepCommand, StepContext};
use crate::ui;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Secrets the publishing steps need
#[derive(Clone, Default)]
pub struct Credentials {
    pub index_token: Option<String>,
    pub github_token: Option<String>,
}

impl Credentials {
    /// Read tokens from the variables named in the config. Empty values
    /// count as unset.
    pub fn from_env(config: &Config) -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Credentials {
            index_token: read(&config.publish.token_env),
            github_token: read(&config.github.token_env),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shown = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("index_token", &shown(&self.index_token))
            .field("github_token", &shown(&self.github_token))
            .finish()
    }
}

/// What a run did, printed at the end or emitted as JSON
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseReport {
    pub trigger: Trigger,
    pub dry_run: bool,
    pub bump: VersionBump,
    pub current_version: Option<Version>,
    pub version: Option<Version>,
    pub tag: Option<String>,
    pub previous_tag: Option<String>,
    pub notes_path: Option<PathBuf>,
    pub stage: Stage,
    pub failed_step: Option<Step>,
    pub executed: Vec<Step>,
    pub skipped: Vec<Step>,
    pub artifacts: Option<Distributions>,
    pub release_url: Option<String>,
    pub warnings: Vec<BoundaryWarning>,
}

impl ReleaseReport {
    fn new(trigger: Trigger) -> Self {
        ReleaseReport {
            trigger,
            dry_run: trigger.is_dry_run(),
            bump: trigger.bump(),
            current_version: None,
            version: None,
            tag: None,
            previous_tag: None,
            notes_path: None,
            stage: Stage::Start,
            failed_step: None,
            executed: Vec::new(),
            skipped: Vec::new(),
            artifacts: None,
            release_url: None,
            warnings: Vec::new(),
        }
    }
}

/// State threaded through the steps of one run
struct Run {
    workdir: PathBuf,
    context: StepContext,
    plan: Option<BumpPlan>,
    report: ReleaseReport,
}

impl Run {
    fn plan(&self) -> Result<&BumpPlan> {
        self.plan
            .as_ref()
            .ok_or_else(|| ReleaseError::inconsistent("No version was computed for this run"))
    }

    fn notes_path(&self) -> Result<PathBuf> {
        self.context
            .notes_path
            .clone()
            .ok_or_else(|| ReleaseError::inconsistent("No release notes path for this run"))
    }

    fn warn(&mut self, warning: BoundaryWarning) {
        ui::display_boundary_warning(&warning);
        self.report.warnings.push(warning);
    }
}

/// Runs a release against a repository, a command runner and a release host
pub struct Pipeline<'a, R: Repository, C: CommandRunner, H: ReleaseHost> {
    config: &'a Config,
    repo: &'a R,
    runner: &'a C,
    host: &'a H,
    credentials: Credentials,
    env_file: Option<PathBuf>,
}

impl<'a, R: Repository, C: CommandRunner, H: ReleaseHost> Pipeline<'a, R, C, H> {
    pub fn new(
        config: &'a Config,
        repo: &'a R,
        runner: &'a C,
        host: &'a H,
        credentials: Credentials,
    ) -> Self {
        Pipeline {
            config,
            repo,
            runner,
            host,
            credentials,
            env_file: None,
        }
    }

    /// Append `VERSION_NAME` and `version_number` to this file once the
    /// version is computed
    pub fn with_env_file(mut self, path: Option<PathBuf>) -> Self {
        self.env_file = path;
        self
    }

    /// Run every step in order. The first failure stops the run.
    pub fn run(&self, trigger: Trigger) -> Result<ReleaseReport> {
        let (report, outcome) = self.run_reporting(trigger);
        outcome.map(|_| report)
    }

    /// Like [Pipeline::run], but always hand back the report. After a
    /// failure its stage is [Stage::Failed] and `failed_step` is set.
    pub fn run_reporting(&self, trigger: Trigger) -> (ReleaseReport, Result<()>) {
        let mut report = ReleaseReport::new(trigger);
        let workdir = match self.repo.workdir() {
            Ok(dir) => dir,
            Err(e) => {
                report.stage = Stage::Failed;
                return (report, Err(e));
            }
        };

        let mut run = Run {
            workdir,
            context: StepContext::new(trigger.bump(), trigger.is_dry_run()),
            plan: None,
            report,
        };

        if trigger.is_dry_run() {
            ui::display_status("Dry run: nothing will be committed, tagged or published");
        }

        for step in Step::ALL {
            if trigger.is_dry_run() && !step.runs_in_dry_run() {
                ui::display_step_skipped(step);
                run.report.skipped.push(step);
                continue;
            }

            ui::display_step_started(step);
            if let Err(source) = self.execute(step, &mut run) {
                let reached = run.report.stage;
                log::debug!("{} failed at stage {}", step, reached);
                run.report.stage = Stage::Failed;
                run.report.failed_step = Some(step);
                let err = ReleaseError::Step {
                    step: step.name(),
                    stage: reached,
                    source: Box::new(source),
                };
                return (run.report, Err(err));
            }

            run.report.executed.push(step);
            if let Some(stage) = step.reaches() {
                run.report.stage = stage;
            }
        }

        run.report.stage = Stage::Done;
        (run.report, Ok(()))
    }

    fn execute(&self, step: Step, run: &mut Run) -> Result<()> {
        match step {
            Step::Checkout => self.checkout(),
            Step::Toolchain => self.toolchain(run),
            Step::ComputeVersion => self.compute_version(run),
            Step::ApplyVersion => self.apply_version(run),
            Step::Install => self.install(run),
            Step::ReleaseNotes => self.release_notes(run),
            Step::CommitNotes => self.commit_notes(run),
            Step::Build => self.build(run),
            Step::Publish => self.publish(run),
            Step::Push => self.push(run),
            Step::GitHubRelease => self.github_release(run),
        }
    }

    fn resolver(&self, workdir: &Path) -> VersionResolver {
        VersionResolver::new(
            workdir,
            &self.config.version.marker,
            &self.config.version.files,
            self.config.tag_pattern(),
        )
    }

    fn command(&self, argv: &[String], run: &Run) -> Result<StepCommand> {
        StepCommand::from_argv(argv, &run.context, &run.workdir)
    }

    fn index_token(&self) -> Result<&str> {
        self.credentials
            .index_token
            .as_deref()
            .ok_or_else(|| ReleaseError::MissingCredential(self.config.publish.token_env.clone()))
    }

    fn github_token(&self) -> Result<&str> {
        self.credentials
            .github_token
            .as_deref()
            .ok_or_else(|| ReleaseError::MissingCredential(self.config.github.token_env.clone()))
    }

    fn repository_slug(&self) -> Result<RepoSlug> {
        if let Some(ref slug) = self.config.github.repository {
            return RepoSlug::parse(slug);
        }

        let remote = &self.config.git.remote;
        self.repo
            .remote_url(remote)?
            .and_then(|url| RepoSlug::from_remote_url(&url))
            .ok_or_else(|| {
                ReleaseError::config(format!(
                    "Cannot determine the GitHub repository from remote '{}'; set github.repository",
                    remote
                ))
            })
    }

    fn checkout(&self) -> Result<()> {
        if !self.config.git.fetch_tags {
            return Ok(());
        }

        let remote = &self.config.git.remote;
        if self.repo.remote_url(remote)?.is_none() {
            return Err(ReleaseError::remote(format!("No remote named '{}'", remote)));
        }
        self.repo.fetch_tags(remote)?;
        ui::display_success(&format!("Fetched tags from {}", remote));
        Ok(())
    }

    fn toolchain(&self, run: &Run) -> Result<()> {
        let commands = &self.config.commands;
        let mut required: Vec<&Vec<String>> = vec![&commands.install, &commands.build];
        if !run.context.dry_run {
            required.push(&commands.notes);
            if let Some(lint) = commands.lint_command() {
                required.push(lint);
            }
            required.push(&commands.publish);
        }

        for argv in required {
            if let Some(program) = argv.first() {
                let path = self.runner.locate(program)?;
                log::debug!("{} -> {}", program, path.display());
            }
        }

        // Fail before anything is mutated rather than after the tag exists
        if !run.context.dry_run {
            self.index_token()?;
            self.github_token()?;
            let slug = self.repository_slug()?;
            log::debug!("Releases will be created on {}", slug);
        }

        Ok(())
    }

    fn compute_version(&self, run: &mut Run) -> Result<()> {
        if !self.repo.is_worktree_clean()? {
            if self.config.version.allow_dirty {
                run.warn(BoundaryWarning::DirtyWorktree);
            } else {
                return Err(ReleaseError::inconsistent(
                    "Working tree has uncommitted changes; commit them or set version.allow_dirty",
                ));
            }
        }

        let plan = self.resolver(&run.workdir).plan(run.context.bump)?;

        if self.repo.find_tag_oid(&plan.tag)?.is_some() {
            return Err(ReleaseError::inconsistent(format!(
                "Tag {} already exists; version {} was released before",
                plan.tag, plan.next
            )));
        }

        let tags = self.repo.list_tags()?;
        let previous = latest_release_tag(&tags, &self.config.tag_pattern(), &plan.next)?;
        if previous.is_none() {
            run.warn(BoundaryWarning::NoPreviousTag {
                new_tag: plan.tag.clone(),
            });
        }

        let notes_path = notes::notes_path(&run.workdir, &self.config.notes.dir, &plan.tag);

        run.context.current_version = Some(plan.current);
        run.context.version = Some(plan.next);
        run.context.tag = Some(plan.tag.clone());
        run.context.previous_tag = previous.clone();
        run.context.notes_path = Some(notes_path.clone());

        run.report.current_version = Some(plan.current);
        run.report.version = Some(plan.next);
        run.report.tag = Some(plan.tag.clone());
        run.report.previous_tag = previous;
        run.report.notes_path = Some(notes_path);

        if let Some(ref path) = self.env_file {
            env_file::export(
                path,
                &[
                    ("VERSION_NAME", plan.bump.to_string()),
                    ("version_number", plan.next.to_string()),
                ],
            )?;
        }

        ui::display_version_plan(&plan, run.context.dry_run);
        run.plan = Some(plan);
        Ok(())
    }

    fn apply_version(&self, run: &mut Run) -> Result<()> {
        let plan = run.plan()?.clone();
        let resolver = self.resolver(&run.workdir);

        let changed = resolver.apply(&plan)?;
        self.repo.stage_paths(&changed)?;

        let message = self
            .config
            .version
            .commit_message
            .replace("{current_version}", &plan.current.to_string())
            .replace("{new_version}", &plan.next.to_string());
        let commit = self.repo.commit(&message)?;
        let head = self.repo.head_oid()?;
        if head != commit {
            return Err(ReleaseError::inconsistent(format!(
                "HEAD moved to {} while committing the version bump {}",
                head, commit
            )));
        }
        self.repo.create_tag(&plan.tag, commit)?;

        // Exact-match check: the tag must now exist on the bump commit
        match self.repo.find_tag_oid(&plan.tag)? {
            Some(oid) if oid == commit => {}
            Some(oid) => {
                return Err(ReleaseError::inconsistent(format!(
                    "Tag {} points at {} instead of the bump commit {}",
                    plan.tag, oid, commit
                )))
            }
            None => {
                return Err(ReleaseError::inconsistent(format!(
                    "Tag {} not found after the version bump",
                    plan.tag
                )))
            }
        }

        let recorded = resolver.current_version()?;
        if recorded != plan.next {
            return Err(ReleaseError::inconsistent(format!(
                "Marker records {} after bump, dry run computed {}",
                recorded, plan.next
            )));
        }

        ui::display_success(&format!("Committed version {} and tagged {}", plan.next, plan.tag));
        Ok(())
    }

    fn install(&self, run: &Run) -> Result<()> {
        let command = self.command(&self.config.commands.install, run)?;
        self.runner.run(&command)?;
        Ok(())
    }

    fn release_notes(&self, run: &mut Run) -> Result<()> {
        let path = run.notes_path()?;
        let command = self.command(&self.config.commands.notes, run)?;

        let notes = notes::generate(self.runner, &command, &path)?;
        if notes.is_empty() {
            run.warn(BoundaryWarning::EmptyReleaseNotes { path: path.clone() });
        }

        ui::display_success(&format!("Release notes written to {}", path.display()));
        Ok(())
    }

    fn commit_notes(&self, run: &mut Run) -> Result<()> {
        let path = run.notes_path()?;
        if !path.is_file() {
            return Err(ReleaseError::NotesMissing(path));
        }

        // pre-commit only checks files in the index
        self.repo.stage_paths(std::slice::from_ref(&path))?;

        if let Some(argv) = self.config.commands.lint_command() {
            let command = self.command(argv, run)?;
            let passes = lint::run_with_retry(self.runner, &command)?;
            if passes > 1 {
                run.warn(BoundaryWarning::LintRetried { passes });
            }
        }

        // Pick up the hooks' fixes to the notes and to any other file
        let mut paths = vec![path];
        paths.extend(self.repo.modified_paths()?);
        self.repo.stage_paths(&paths)?;

        let plan = run.plan()?;
        let message = self
            .config
            .notes
            .commit_message
            .replace("{tag}", &plan.tag)
            .replace("{version}", &plan.next.to_string());

        self.repo.commit(&message)?;
        Ok(())
    }

    fn build(&self, run: &mut Run) -> Result<()> {
        let plan = run.plan()?;
        // A dry run builds the unbumped tree
        let expected = if run.context.dry_run {
            plan.current
        } else {
            plan.next
        };

        let dist_dir = run.workdir.join(&self.config.publish.dist_dir);
        artifacts::clean_dist_dir(&dist_dir)?;

        let command = self.command(&self.config.commands.build, run)?;
        self.runner.run(&command)?;

        let dists = artifacts::collect_distributions(&dist_dir, &expected)?;
        ui::display_success(&format!(
            "Built {} and {}",
            dists.sdist.display(),
            dists.wheel.display()
        ));
        run.report.artifacts = Some(dists);
        Ok(())
    }

    fn publish(&self, run: &Run) -> Result<()> {
        let token = self.index_token()?;
        let dists = run
            .report
            .artifacts
            .as_ref()
            .ok_or_else(|| ReleaseError::artifact("Nothing was built to publish"))?;

        let publish = &self.config.publish;
        let mut command = self.command(&self.config.commands.publish, run)?;
        for path in dists.paths() {
            command = command.arg(path.display().to_string());
        }
        let command = command
            .env(publish.username_env.as_str(), publish.username.as_str())
            .env(publish.password_env.as_str(), token);

        self.runner.run(&command)?;
        ui::display_success("Published distributions to the package index");
        Ok(())
    }

    fn push(&self, run: &Run) -> Result<()> {
        let tag = &run.plan()?.tag;
        let branch = self.repo.current_branch()?;
        let remote = &self.config.git.remote;

        let refspecs = vec![
            format!("refs/heads/{0}:refs/heads/{0}", branch),
            format!("refs/tags/{0}:refs/tags/{0}", tag),
        ];
        self.repo.push(remote, &refspecs)?;

        ui::display_success(&format!("Pushed {} and {} to {}", branch, tag, remote));
        Ok(())
    }

    fn github_release(&self, run: &mut Run) -> Result<()> {
        let token = self.github_token()?;
        let slug = self.repository_slug()?;
        let notes = ReleaseNotes::load(&run.notes_path()?)?;
        let tag = run.plan()?.tag.clone();

        let request = ReleaseRequest {
            tag_name: tag.clone(),
            name: tag,
            body: notes.body,
            draft: self.config.github.draft,
            prerelease: self.config.github.prerelease,
        };

        let release = self.host.create_release(&slug, &request, token)?;
        ui::display_success(&format!("Created GitHub release {}", release.html_url));
        run.report.release_url = Some(release.html_url);
        Ok(())
    }
}
