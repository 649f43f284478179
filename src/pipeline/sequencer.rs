//! The step sequencer.
//!
//! A single driver loop walks the transition table. At each state with a
//! step it consults the idempotency gate, executes the step if needed, and
//! moves forward on success or to [`BuildState::Failed`] on the first error.

use std::fs;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::build_log::BuildLog;
use crate::context::BuildContext;
use crate::error::{BuildError, Result};
use crate::process::ProcessRunner;

use super::gate::{run_check, write_marker, CheckResult};
use super::state::BuildState;
use super::step::{pipeline_steps, BuildStep};

/// Progress events emitted while the pipeline runs.
#[derive(Debug)]
pub enum StepEvent<'a> {
    /// A step is about to execute.
    Starting { step: &'a BuildStep },
    /// A step's effect already exists.
    Skipped {
        step: &'a BuildStep,
        check: &'a CheckResult,
    },
    /// A step executed successfully.
    Finished {
        step: &'a BuildStep,
        duration: Duration,
    },
    /// A step failed; the run stops here.
    Failed {
        step: &'a BuildStep,
        error: &'a BuildError,
    },
}

/// What happened to one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step ran and succeeded.
    Executed,
    /// The gate reported the effect already present.
    Skipped(CheckResult),
    /// The step ran and failed.
    Failed,
}

/// Record of one visited step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub state: BuildState,
    pub label: &'static str,
    pub outcome: StepOutcome,
}

/// Result of driving the pipeline to a terminal state.
#[derive(Debug)]
pub struct RunReport {
    /// Non-terminal states entered, in order.
    pub visited: Vec<BuildState>,
    /// One record per step reached.
    pub steps: Vec<StepRecord>,
    /// `Complete` or `Failed`.
    pub final_state: BuildState,
    /// The error that moved the pipeline to `Failed`.
    pub error: Option<BuildError>,
    /// Wall time of the whole run.
    pub duration: Duration,
}

impl RunReport {
    /// Whether the run reached `Complete`.
    pub fn success(&self) -> bool {
        self.final_state == BuildState::Complete
    }

    /// Number of steps that actually executed (successfully or not).
    pub fn executed(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| !matches!(s.outcome, StepOutcome::Skipped(_)))
            .count()
    }

    /// Number of steps skipped by the gate.
    pub fn skipped(&self) -> usize {
        self.steps.len() - self.executed()
    }
}

/// Drives the fixed step order for one context.
pub struct Sequencer<'a> {
    ctx: &'a BuildContext,
    steps: Vec<BuildStep>,
    runner: &'a mut dyn ProcessRunner,
    log: BuildLog,
}

impl<'a> Sequencer<'a> {
    /// Create a sequencer over the standard step table.
    pub fn new(ctx: &'a BuildContext, runner: &'a mut dyn ProcessRunner) -> Self {
        Self {
            ctx,
            steps: pipeline_steps(ctx),
            runner,
            log: BuildLog::new(ctx.log_path()),
        }
    }

    /// The state this sequencer starts from.
    pub fn entry_state(&self) -> BuildState {
        BuildState::entry(self.ctx.build_only())
    }

    /// Run to a terminal state.
    pub fn run(&mut self) -> RunReport {
        self.run_with_progress(|_| {})
    }

    /// Run to a terminal state, reporting each step as it goes.
    pub fn run_with_progress(&mut self, mut on_event: impl FnMut(StepEvent<'_>)) -> RunReport {
        let start = Instant::now();
        let mut state = self.entry_state();
        let mut visited = Vec::new();
        let mut records = Vec::new();
        let mut error = None;

        info!(
            "Building libwebrtc {} ({} on {}, {})",
            self.ctx.revision(),
            self.ctx.target_arch(),
            self.ctx.host_arch(),
            self.ctx.configuration()
        );
        debug!("Entering pipeline at {}", state);

        while !state.is_terminal() {
            visited.push(state);

            let Some(index) = self.steps.iter().position(|s| s.state == state) else {
                // Idle has no entry action.
                state = state.next().unwrap_or(BuildState::Complete);
                continue;
            };
            let step = &self.steps[index];

            if let Some(check) = &step.check {
                let result = run_check(check);
                if result.complete {
                    info!("{}: skip ({})", step.label, result.description);
                    on_event(StepEvent::Skipped {
                        step,
                        check: &result,
                    });
                    records.push(StepRecord {
                        state,
                        label: step.label,
                        outcome: StepOutcome::Skipped(result),
                    });
                    state = step.on_success;
                    continue;
                }
                debug!("{}: {}", step.label, result.description);
            }

            on_event(StepEvent::Starting { step });
            let step_start = Instant::now();

            match execute(step, &mut self.log, &mut *self.runner) {
                Ok(()) => {
                    let duration = step_start.elapsed();
                    info!("{}: done in {:?}", step.label, duration);
                    on_event(StepEvent::Finished { step, duration });
                    records.push(StepRecord {
                        state,
                        label: step.label,
                        outcome: StepOutcome::Executed,
                    });
                    state = step.on_success;
                }
                Err(e) => {
                    info!("{}: failed: {}", step.label, e);
                    on_event(StepEvent::Failed { step, error: &e });
                    records.push(StepRecord {
                        state,
                        label: step.label,
                        outcome: StepOutcome::Failed,
                    });
                    error = Some(e);
                    state = BuildState::Failed;
                }
            }
        }

        RunReport {
            visited,
            steps: records,
            final_state: state,
            error,
            duration: start.elapsed(),
        }
    }
}

/// Execute one step. The log handle is released on every path out.
fn execute(step: &BuildStep, log: &mut BuildLog, runner: &mut dyn ProcessRunner) -> Result<()> {
    let mut handle = log.open_step(step.label, &step.describe())?;

    for dir in &step.dirs {
        if dir.is_dir() {
            continue;
        }
        if let Err(e) = fs::create_dir_all(dir) {
            let _ = handle.line(&format!("mkdir {} failed: {}", dir.display(), e));
            return Err(BuildError::filesystem(dir, e));
        }
        handle.line(&format!("created {}", dir.display()))?;
    }

    if let Some(invocation) = &step.command {
        let result = match runner.run(invocation, &mut handle) {
            Ok(result) => result,
            Err(e) => {
                let _ = handle.line(&format!("error: {}", e));
                return Err(e);
            }
        };

        if !result.success() {
            let err = BuildError::ExternalToolFailed {
                step: step.label.to_string(),
                command: invocation.command_line(),
                code: result.code,
                signal: result.signal,
            };
            let _ = handle.line(&format!("error: {}", err));
            return Err(err);
        }
    }

    if let Some(marker) = &step.marker {
        write_marker(marker, &step.describe())?;
    }

    handle.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{resolve, Arch, HostEnv, Os, RawOptions};
    use crate::process::{MockOutcome, MockRunner};
    use tempfile::TempDir;

    fn context(root: &std::path::Path, build_only: bool) -> BuildContext {
        let host = HostEnv {
            arch: Arch::X64,
            os: Os::Linux,
            path: Some("/usr/bin".to_string()),
            build_only,
        };
        resolve(&RawOptions::default(), &host, root).unwrap()
    }

    /// A runner whose tools leave behind what the real ones would.
    fn faithful_runner(ctx: &BuildContext) -> MockRunner {
        MockRunner::new()
            .creates_dir("git clone", ctx.depot_tools_dir())
            .creates_file("gclient config", ctx.webrtc_dir().join(".gclient"))
            .creates_dir("gclient sync", ctx.webrtc_dir().join("trunk"))
    }

    #[test]
    fn fresh_tree_runs_every_step() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path(), false);
        let mut runner = faithful_runner(&ctx);

        let report = Sequencer::new(&ctx, &mut runner).run();

        assert!(report.success());
        assert!(report.error.is_none());
        assert_eq!(report.visited.len(), 7);
        assert_eq!(report.executed(), 6);
        assert_eq!(runner.invocations().len(), 5);
    }

    #[test]
    fn failure_stops_the_pipeline() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path(), false);
        let mut runner = faithful_runner(&ctx).respond("gclient config", MockOutcome::Exit(1));

        let report = Sequencer::new(&ctx, &mut runner).run();

        assert_eq!(report.final_state, BuildState::Failed);
        assert_eq!(
            report.visited.last(),
            Some(&BuildState::ConfiguringClient)
        );
        assert_eq!(runner.invocations().len(), 2);
        assert!(matches!(
            report.error,
            Some(BuildError::ExternalToolFailed { code: Some(1), .. })
        ));
    }

    #[test]
    fn skipped_steps_do_not_touch_the_runner() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path(), false);
        fs::create_dir_all(ctx.depot_tools_dir()).unwrap();
        let mut runner = faithful_runner(&ctx);

        let report = Sequencer::new(&ctx, &mut runner).run();

        assert!(report.success());
        assert_eq!(report.skipped(), 2);
        assert!(runner.command_lines().iter().all(|c| !c.starts_with("git")));
    }

    #[test]
    fn marker_written_only_after_success() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path(), false);
        let marker = super::super::step::sync_marker(&ctx);

        let mut failing = faithful_runner(&ctx).respond("gclient sync", MockOutcome::Exit(2));
        Sequencer::new(&ctx, &mut failing).run();
        assert!(!marker.exists());

        let mut passing = faithful_runner(&ctx);
        assert!(Sequencer::new(&ctx, &mut passing).run().success());
        assert!(marker.exists());
    }

    #[test]
    fn events_arrive_in_step_order() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path(), false);
        let mut runner = faithful_runner(&ctx);
        let mut seen = Vec::new();

        Sequencer::new(&ctx, &mut runner).run_with_progress(|event| {
            let tag = match event {
                StepEvent::Starting { step } => format!("start {}", step.state),
                StepEvent::Finished { step, .. } => format!("done {}", step.state),
                StepEvent::Skipped { step, .. } => format!("skip {}", step.state),
                StepEvent::Failed { step, .. } => format!("fail {}", step.state),
            };
            seen.push(tag);
        });

        assert_eq!(seen.first().map(String::as_str), Some("start preparing-dirs"));
        assert_eq!(seen.last().map(String::as_str), Some("done building"));
        assert_eq!(seen.len(), 12);
    }

    #[test]
    fn directory_creation_failure_is_fatal() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path(), false);
        fs::create_dir_all(ctx.depot_tools_dir()).unwrap();
        // A regular file where the gclient solution directory should go.
        fs::write(ctx.webrtc_dir(), "not a directory").unwrap();
        let mut runner = faithful_runner(&ctx);

        let report = Sequencer::new(&ctx, &mut runner).run();

        assert_eq!(report.final_state, BuildState::Failed);
        assert_eq!(report.visited.last(), Some(&BuildState::ConfiguringClient));
        assert!(matches!(report.error, Some(BuildError::Filesystem { .. })));
        assert!(runner.invocations().is_empty());
    }
}
