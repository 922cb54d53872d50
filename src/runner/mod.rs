//! External command execution for pipeline steps
//!
//! Every tool the release relies on (installer, notes generator, linter,
//! build backend, uploader) is an opaque command run through
//! [CommandRunner].

pub mod context;
pub mod env_file;
pub mod executor;
pub mod mock;

pub use context::StepContext;
pub use executor::SystemRunner;
pub use mock::MockRunner;

use crate::error::{ReleaseError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// A fully resolved command ready to run
#[derive(Debug, Clone, PartialEq)]
pub struct StepCommand {
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub cwd: PathBuf,
}

impl StepCommand {
    /// Build a command from a configured argv, expanding placeholders from
    /// `context` and exporting its environment.
    pub fn from_argv(argv: &[String], context: &StepContext, cwd: &Path) -> Result<Self> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| ReleaseError::config("Empty command"))?;

        Ok(StepCommand {
            program: context.expand(program),
            args: args.iter().map(|a| context.expand(a)).collect(),
            env: context.to_env_vars(),
            cwd: cwd.to_path_buf(),
        })
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for StepCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured output of a successful command
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs external commands for pipeline steps
pub trait CommandRunner {
    /// Run to completion. Non-zero exit is [ReleaseError::CommandFailed].
    fn run(&self, command: &StepCommand) -> Result<CommandOutput>;

    /// Resolve a program to an executable path
    fn locate(&self, program: &str) -> Result<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Version, VersionBump};

    #[test]
    fn test_from_argv_expands_and_exports() {
        let mut ctx = StepContext::new(VersionBump::Patch, false);
        ctx.version = Some(Version::new(1, 2, 4));
        ctx.tag = Some("v1.2.4".to_string());

        let argv = vec!["gh".to_string(), "release".to_string(), "{tag}".to_string()];
        let cmd = StepCommand::from_argv(&argv, &ctx, Path::new("/work")).unwrap();

        assert_eq!(cmd.program, "gh");
        assert_eq!(cmd.args, vec!["release", "v1.2.4"]);
        assert_eq!(cmd.env.get("version_number"), Some(&"1.2.4".to_string()));
        assert_eq!(cmd.to_string(), "gh release v1.2.4");
    }

    #[test]
    fn test_from_empty_argv_fails() {
        let ctx = StepContext::new(VersionBump::Patch, false);
        assert!(StepCommand::from_argv(&[], &ctx, Path::new("/work")).is_err());
    }

    #[test]
    fn test_builder_methods() {
        let ctx = StepContext::new(VersionBump::Patch, false);
        let cmd = StepCommand::from_argv(&["twine".to_string()], &ctx, Path::new("/work"))
            .unwrap()
            .arg("upload")
            .env("TWINE_USERNAME", "__token__");

        assert_eq!(cmd.args, vec!["upload"]);
        assert_eq!(cmd.env.get("TWINE_USERNAME"), Some(&"__token__".to_string()));
    }
}
