use crate::domain::VersionBump;
use serde::Serialize;

/// CI event that started the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum EventKind {
    /// Manual dispatch: full release
    #[default]
    #[value(name = "workflow_dispatch", alias = "dispatch")]
    WorkflowDispatch,
    /// Pull request: dry-run validation only
    #[value(name = "pull_request", alias = "pr")]
    PullRequest,
}

/// How a pipeline run was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Trigger {
    Dispatch { bump: VersionBump, dry_run: bool },
    PullRequest { bump: VersionBump },
}

impl Trigger {
    /// Build the trigger for an event. Pull requests never mutate.
    pub fn from_event(event: EventKind, bump: VersionBump, force_dry_run: bool) -> Self {
        match event {
            EventKind::WorkflowDispatch => Trigger::Dispatch {
                bump,
                dry_run: force_dry_run,
            },
            EventKind::PullRequest => Trigger::PullRequest { bump },
        }
    }

    pub fn bump(&self) -> VersionBump {
        match self {
            Trigger::Dispatch { bump, .. } | Trigger::PullRequest { bump } => *bump,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        match self {
            Trigger::Dispatch { dry_run, .. } => *dry_run,
            Trigger::PullRequest { .. } => true,
        }
    }
}
