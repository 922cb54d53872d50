//! Release notes: path convention and the external generator

use crate::error::{ReleaseError, Result};
use crate::runner::{CommandRunner, StepCommand};
use std::fs;
use std::path::{Path, PathBuf};

/// `<workdir>/<dir>/<tag>.md`, e.g. `docs/releases/v1.2.4.md`
pub fn notes_path(workdir: &Path, dir: &Path, tag: &str) -> PathBuf {
    workdir.join(dir).join(format!("{}.md", tag))
}

/// Release notes read back from disk
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseNotes {
    pub path: PathBuf,
    pub body: String,
}

impl ReleaseNotes {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ReleaseError::NotesMissing(path.to_path_buf()));
        }
        let body = fs::read_to_string(path)?;
        Ok(ReleaseNotes {
            path: path.to_path_buf(),
            body,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }
}

/// Run the generator and check it wrote exactly the expected file.
///
/// The generator is expected to read history since the previous tag on its
/// own; the pipeline only supplies the context through `command`.
pub fn generate<C: CommandRunner>(
    runner: &C,
    command: &StepCommand,
    expected: &Path,
) -> Result<ReleaseNotes> {
    if let Some(parent) = expected.parent() {
        fs::create_dir_all(parent)?;
    }

    runner.run(command)?;
    ReleaseNotes::load(expected)
}
