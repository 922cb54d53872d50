use serde::Serialize;
use std::fmt;

/// How far a release has progressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Stage {
    Start,
    VersionComputed,
    VersionCommitted,
    NotesWritten,
    NotesCommitted,
    Built,
    Published,
    Pushed,
    Released,
    Done,
    Failed,
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Pipeline steps in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    Checkout,
    Toolchain,
    ComputeVersion,
    ApplyVersion,
    Install,
    ReleaseNotes,
    CommitNotes,
    Build,
    Publish,
    Push,
    GitHubRelease,
}

impl Step {
    pub const ALL: [Step; 11] = [
        Step::Checkout,
        Step::Toolchain,
        Step::ComputeVersion,
        Step::ApplyVersion,
        Step::Install,
        Step::ReleaseNotes,
        Step::CommitNotes,
        Step::Build,
        Step::Publish,
        Step::Push,
        Step::GitHubRelease,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Step::Checkout => "checkout",
            Step::Toolchain => "toolchain",
            Step::ComputeVersion => "compute-version",
            Step::ApplyVersion => "apply-version",
            Step::Install => "install",
            Step::ReleaseNotes => "release-notes",
            Step::CommitNotes => "commit-notes",
            Step::Build => "build",
            Step::Publish => "publish",
            Step::Push => "push",
            Step::GitHubRelease => "github-release",
        }
    }

    /// Steps that only read or validate run in dry-run mode too
    pub fn runs_in_dry_run(&self) -> bool {
        matches!(
            self,
            Step::Checkout | Step::Toolchain | Step::ComputeVersion | Step::Install | Step::Build
        )
    }

    /// Stage entered when this step succeeds, if it marks one
    pub fn reaches(&self) -> Option<Stage> {
        match self {
            Step::ComputeVersion => Some(Stage::VersionComputed),
            Step::ApplyVersion => Some(Stage::VersionCommitted),
            Step::ReleaseNotes => Some(Stage::NotesWritten),
            Step::CommitNotes => Some(Stage::NotesCommitted),
            Step::Build => Some(Stage::Built),
            Step::Publish => Some(Stage::Published),
            Step::Push => Some(Stage::Pushed),
            Step::GitHubRelease => Some(Stage::Released),
            Step::Checkout | Step::Toolchain | Step::Install => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
