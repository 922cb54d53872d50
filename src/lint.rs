//! Formatting pass with a single retry

use crate::error::{ReleaseError, Result};
use crate::runner::{CommandRunner, StepCommand};

/// Passes allowed before the lint failure is fatal
pub const MAX_LINT_PASSES: usize = 2;

/// Run the lint command, re-running once if the first pass fails.
///
/// Auto-fixing linters (pre-commit hooks) exit non-zero on the pass that
/// rewrites files, so the second pass decides. Returns the number of passes
/// used.
pub fn run_with_retry<C: CommandRunner>(runner: &C, command: &StepCommand) -> Result<usize> {
    let mut last_output = String::new();

    for attempt in 1..=MAX_LINT_PASSES {
        match runner.run(command) {
            Ok(_) => return Ok(attempt),
            Err(ReleaseError::CommandFailed { stdout, stderr, .. }) => {
                log::info!("Lint pass {} of {} failed", attempt, MAX_LINT_PASSES);
                last_output = format!("{}{}", stdout, stderr);
            }
            Err(other) => return Err(other),
        }
    }

    Err(ReleaseError::LintFailed {
        attempts: MAX_LINT_PASSES,
        output: last_output,
    })
}
