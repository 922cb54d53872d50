use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::Stage;

/// Unified error type for pyrelease operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Version error: {0}")]
    Version(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Inconsistent release state: {0}")]
    Inconsistent(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("Command not found on PATH: {program}")]
    ToolNotFound { program: String },

    #[error("Command `{command}` failed with exit code {code}\nStdout: {stdout}\nStderr: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("Lint still failing after {attempts} passes: {output}")]
    LintFailed { attempts: usize, output: String },

    #[error("Release notes not found at {}", .0.display())]
    NotesMissing(PathBuf),

    #[error("Artifact error: {0}")]
    Artifact(String),

    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API returned {status}: {body}")]
    GitHub { status: u16, body: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Step '{step}' failed after reaching {stage}: {source}")]
    Step {
        step: &'static str,
        stage: Stage,
        #[source]
        source: Box<ReleaseError>,
    },
}

/// Failure classes, used to decide how a failure is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before anything ran
    Input,
    /// Dry-run and real bump disagree, or a tag is missing / duplicated
    Consistency,
    /// An external command, the package index or GitHub failed
    ExternalTool,
    /// Formatting pass failed twice
    Lint,
    /// Local environment problem: config, credentials, files, git
    Environment,
}

/// Convenience type alias for Results in pyrelease
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    pub fn input(msg: impl Into<String>) -> Self {
        ReleaseError::Input(msg.into())
    }

    pub fn version(msg: impl Into<String>) -> Self {
        ReleaseError::Version(msg.into())
    }

    pub fn tag(msg: impl Into<String>) -> Self {
        ReleaseError::Tag(msg.into())
    }

    pub fn inconsistent(msg: impl Into<String>) -> Self {
        ReleaseError::Inconsistent(msg.into())
    }

    pub fn remote(msg: impl Into<String>) -> Self {
        ReleaseError::Remote(msg.into())
    }

    pub fn artifact(msg: impl Into<String>) -> Self {
        ReleaseError::Artifact(msg.into())
    }

    /// Classify the error. Step failures report the kind of their cause.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReleaseError::Input(_) => ErrorKind::Input,
            ReleaseError::Inconsistent(_) | ReleaseError::Tag(_) => ErrorKind::Consistency,
            ReleaseError::CommandFailed { .. }
            | ReleaseError::NotesMissing(_)
            | ReleaseError::Artifact(_)
            | ReleaseError::Http(_)
            | ReleaseError::GitHub { .. }
            | ReleaseError::Remote(_) => ErrorKind::ExternalTool,
            ReleaseError::LintFailed { .. } => ErrorKind::Lint,
            ReleaseError::Step { source, .. } => source.kind(),
            ReleaseError::Git(_)
            | ReleaseError::Config(_)
            | ReleaseError::ConfigParse(_)
            | ReleaseError::Version(_)
            | ReleaseError::ToolNotFound { .. }
            | ReleaseError::MissingCredential(_)
            | ReleaseError::Io(_) => ErrorKind::Environment,
        }
    }
}
