use crate::error::{ReleaseError, Result};
use crate::runner::{CommandOutput, CommandRunner, StepCommand};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

type SideEffect = Box<dyn Fn(&StepCommand) -> std::io::Result<()>>;

/// Records commands instead of running them.
///
/// Failures and side effects are keyed by program name.
#[derive(Default)]
pub struct MockRunner {
    calls: RefCell<Vec<StepCommand>>,
    failures: RefCell<HashMap<String, usize>>,
    missing: HashSet<String>,
    effects: HashMap<String, SideEffect>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `times` runs of `program` exit with code 1
    pub fn fail(&self, program: impl Into<String>, times: usize) {
        self.failures.borrow_mut().insert(program.into(), times);
    }

    /// Pretend `program` is not installed
    pub fn missing(&mut self, program: impl Into<String>) {
        self.missing.insert(program.into());
    }

    /// Run `effect` whenever `program` runs successfully
    pub fn on_run<F>(&mut self, program: impl Into<String>, effect: F)
    where
        F: Fn(&StepCommand) -> std::io::Result<()> + 'static,
    {
        self.effects.insert(program.into(), Box::new(effect));
    }

    pub fn calls(&self) -> Vec<StepCommand> {
        self.calls.borrow().clone()
    }

    /// Commands run for `program`, in order
    pub fn calls_to(&self, program: &str) -> Vec<StepCommand> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.program == program)
            .cloned()
            .collect()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, command: &StepCommand) -> Result<CommandOutput> {
        self.calls.borrow_mut().push(command.clone());

        if self.missing.contains(&command.program) {
            return Err(ReleaseError::ToolNotFound {
                program: command.program.clone(),
            });
        }

        if let Some(remaining) = self.failures.borrow_mut().get_mut(&command.program) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ReleaseError::CommandFailed {
                    command: command.to_string(),
                    code: 1,
                    stdout: String::new(),
                    stderr: format!("{} failed (mock)", command.program),
                });
            }
        }

        if let Some(effect) = self.effects.get(&command.program) {
            effect(command)?;
        }

        Ok(CommandOutput::default())
    }

    fn locate(&self, program: &str) -> Result<PathBuf> {
        if self.missing.contains(program) {
            Err(ReleaseError::ToolNotFound {
                program: program.to_string(),
            })
        } else {
            Ok(PathBuf::from(program))
        }
    }
}
