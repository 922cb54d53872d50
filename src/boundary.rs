use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Non-fatal conditions noticed during a release run.
/// They are reported to the user but never stop the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundaryWarning {
    /// No earlier release tag: notes cover the whole history
    NoPreviousTag { new_tag: String },
    /// Tracked files were modified before the bump and `allow_dirty` is set
    DirtyWorktree,
    /// The notes generator wrote an empty file
    EmptyReleaseNotes { path: PathBuf },
    /// The formatting pass only succeeded on its second run
    LintRetried { passes: usize },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoPreviousTag { new_tag } => write!(
                f,
                "No previous release tag found; {} will be the first release",
                new_tag
            ),
            BoundaryWarning::DirtyWorktree => write!(
                f,
                "Working tree has uncommitted changes; they are not part of the release commit"
            ),
            BoundaryWarning::EmptyReleaseNotes { path } => {
                write!(f, "Release notes at {} are empty", path.display())
            }
            BoundaryWarning::LintRetried { passes } => {
                write!(f, "Formatting fixes were applied; lint passed on pass {}", passes)
            }
        }
    }
}
