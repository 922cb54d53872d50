use crate::error::{ReleaseError, Result};
use crate::runner::{CommandOutput, CommandRunner, StepCommand};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Runs step commands as real subprocesses
#[derive(Debug, Default, Clone)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        SystemRunner
    }
}

impl CommandRunner for SystemRunner {
    /// Execute a command and wait for it.
    ///
    /// Output is captured. A non-zero exit code becomes
    /// [ReleaseError::CommandFailed] carrying both streams.
    fn run(&self, command: &StepCommand) -> Result<CommandOutput> {
        log::debug!("Running `{}` in {}", command, command.cwd.display());

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args).current_dir(&command.cwd);

        for (key, value) in &command.env {
            cmd.env(key, value);
        }

        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ReleaseError::ToolNotFound {
                    program: command.program.clone(),
                }
            } else {
                ReleaseError::Io(e)
            }
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(ReleaseError::CommandFailed {
                command: command.to_string(),
                code: output.status.code().unwrap_or(-1),
                stdout,
                stderr,
            });
        }

        log::trace!("`{}` stdout:\n{}", command.program, stdout);
        Ok(CommandOutput { stdout, stderr })
    }

    fn locate(&self, program: &str) -> Result<PathBuf> {
        let path = Path::new(program);
        if path.components().count() > 1 {
            return if path.is_file() {
                Ok(path.to_path_buf())
            } else {
                Err(ReleaseError::ToolNotFound {
                    program: program.to_string(),
                })
            };
        }

        which::which(program).map_err(|_| ReleaseError::ToolNotFound {
            program: program.to_string(),
        })
    }
}
