//! Mock runner implementation for testing.
//!
//! `MockRunner` implements the `ProcessRunner` trait without spawning
//! anything. It records every invocation, writes a line of fake output to
//! the log, can create files or directories to imitate a tool's side
//! effects, and can be scripted to fail.
//!
//! # Example
//!
//! ```
//! use wrtc_build::build_log::BuildLog;
//! use wrtc_build::process::{Invocation, MockOutcome, MockRunner, ProcessRunner};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let mut log = BuildLog::new(dir.path().join("build.log"));
//! let mut runner = MockRunner::new().respond("gclient sync", MockOutcome::Exit(1));
//!
//! let sync = Invocation::new("gclient", dir.path()).arg("sync");
//! let mut handle = log.open_step("sync", &sync.command_line()).unwrap();
//! let result = runner.run(&sync, &mut handle).unwrap();
//!
//! assert!(!result.success());
//! assert_eq!(runner.command_lines(), ["gclient sync"]);
//! ```

use std::fs;
use std::io;
use std::path::PathBuf;

use crate::build_log::LogHandle;
use crate::error::{BuildError, Result};

use super::command::{Invocation, ProcessResult};
use super::runner::ProcessRunner;

/// Scripted result for a matching invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOutcome {
    /// Exit with the given code.
    Exit(i32),
    /// Die from the given signal.
    Signal(i32),
    /// Fail to launch, as if the program were not installed.
    Unavailable,
}

#[derive(Debug, Clone)]
enum Effect {
    Dir(PathBuf),
    File(PathBuf),
}

/// Mock process runner.
///
/// Patterns match against [`Invocation::command_line`] by substring; the
/// first matching rule wins. Unmatched invocations succeed.
#[derive(Debug, Default)]
pub struct MockRunner {
    invocations: Vec<Invocation>,
    outcomes: Vec<(String, MockOutcome)>,
    effects: Vec<(String, Effect)>,
    echo: bool,
}

impl MockRunner {
    /// Create a runner where every invocation succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the outcome of invocations whose command line contains `pattern`.
    pub fn respond(mut self, pattern: impl Into<String>, outcome: MockOutcome) -> Self {
        self.outcomes.push((pattern.into(), outcome));
        self
    }

    /// Create a directory when a matching invocation succeeds.
    pub fn creates_dir(mut self, pattern: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.effects.push((pattern.into(), Effect::Dir(path.into())));
        self
    }

    /// Create an empty file when a matching invocation succeeds.
    pub fn creates_file(mut self, pattern: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.effects.push((pattern.into(), Effect::File(path.into())));
        self
    }

    /// Every invocation received, in order.
    pub fn invocations(&self) -> &[Invocation] {
        &self.invocations
    }

    /// Rendered command lines of every invocation, in order.
    pub fn command_lines(&self) -> Vec<String> {
        self.invocations.iter().map(Invocation::command_line).collect()
    }

    /// Whether the caller asked for live output.
    pub fn echoes(&self) -> bool {
        self.echo
    }

    /// Forget recorded invocations, keeping the script.
    pub fn clear(&mut self) {
        self.invocations.clear();
    }

    fn apply_effects(&self, command_line: &str) -> Result<()> {
        for (pattern, effect) in &self.effects {
            if !command_line.contains(pattern.as_str()) {
                continue;
            }
            match effect {
                Effect::Dir(path) => {
                    fs::create_dir_all(path).map_err(|e| BuildError::filesystem(path, e))?
                }
                Effect::File(path) => {
                    if let Some(parent) = path.parent() {
                        fs::create_dir_all(parent)
                            .map_err(|e| BuildError::filesystem(parent, e))?;
                    }
                    fs::write(path, b"").map_err(|e| BuildError::filesystem(path, e))?
                }
            }
        }
        Ok(())
    }
}

impl ProcessRunner for MockRunner {
    fn set_echo(&mut self, echo: bool) {
        self.echo = echo;
    }

    fn run(&mut self, invocation: &Invocation, log: &mut LogHandle) -> Result<ProcessResult> {
        self.invocations.push(invocation.clone());
        let command_line = invocation.command_line();

        let outcome = self
            .outcomes
            .iter()
            .find(|(pattern, _)| command_line.contains(pattern.as_str()))
            .map(|(_, outcome)| *outcome)
            .unwrap_or(MockOutcome::Exit(0));

        match outcome {
            MockOutcome::Unavailable => Err(BuildError::ExternalToolUnavailable {
                command: invocation.program.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "mock: program not found"),
            }),
            MockOutcome::Signal(signal) => {
                log.line(&format!("mock: {} killed", command_line))?;
                Ok(ProcessResult::signaled(signal))
            }
            MockOutcome::Exit(code) => {
                log.line(&format!("mock: {} -> {}", command_line, code))?;
                if code == 0 {
                    self.apply_effects(&command_line)?;
                }
                Ok(ProcessResult::exited(code))
            }
        }
    }
}
