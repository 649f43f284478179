//! Output mode and progress writer.

use std::io::{self, Write};

use crate::pipeline::{PlannedStep, StepEvent};

use super::theme::Theme;

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Show step lines, commands and live tool output.
    Verbose,
    /// Show one line per step.
    #[default]
    Normal,
    /// Show only the final status.
    Quiet,
}

impl OutputMode {
    /// Check if this mode echoes tool output to the terminal.
    pub fn shows_command_output(&self) -> bool {
        matches!(self, Self::Verbose)
    }

    /// Check if this mode shows per-step progress lines.
    pub fn shows_steps(&self) -> bool {
        matches!(self, Self::Verbose | Self::Normal)
    }
}

/// Progress writer that respects output mode.
///
/// In normal mode each step prints `Label ... ` and completes the line with
/// `done`, `skip` or `error` once the step ends. In verbose mode the label
/// gets its own line so echoed tool output does not break it up.
#[derive(Debug)]
pub struct Output<W: Write = io::Stdout> {
    mode: OutputMode,
    theme: Theme,
    out: W,
}

impl Output<io::Stdout> {
    /// Create a writer on stdout.
    pub fn stdout(mode: OutputMode, theme: Theme) -> Self {
        Self::new(mode, theme, io::stdout())
    }
}

impl<W: Write> Output<W> {
    /// Create a writer on an arbitrary sink.
    pub fn new(mode: OutputMode, theme: Theme, out: W) -> Self {
        Self { mode, theme, out }
    }

    /// Get the output mode.
    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Switch normal output to verbose. Quiet output stays quiet.
    pub fn set_verbose(&mut self, verbose: bool) {
        if verbose && self.mode == OutputMode::Normal {
            self.mode = OutputMode::Verbose;
        }
    }

    /// Get the writer back (for tests).
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write a line if the mode shows progress.
    pub fn println(&mut self, msg: &str) {
        if self.mode.shows_steps() {
            let _ = writeln!(self.out, "{}", msg);
        }
    }

    /// Write a warning line.
    pub fn warning(&mut self, msg: &str) {
        if self.mode.shows_steps() {
            let _ = writeln!(self.out, "{}", self.theme.warning.apply_to(msg));
        }
    }

    /// Write the final success line. Shown in every mode.
    pub fn success(&mut self, msg: &str) {
        let _ = writeln!(self.out, "{}", self.theme.success.apply_to(msg));
        let _ = self.out.flush();
    }

    /// Render one pipeline event.
    pub fn step_event(&mut self, event: &StepEvent<'_>) {
        if !self.mode.shows_steps() {
            return;
        }
        let verbose = self.mode == OutputMode::Verbose;

        let _ = match event {
            StepEvent::Starting { step } if verbose => writeln!(
                self.out,
                "{} ...\n  {}",
                self.theme.highlight.apply_to(step.label),
                self.theme.command.apply_to(step.describe())
            ),
            StepEvent::Starting { step } => write!(self.out, "{} ... ", step.label),
            StepEvent::Skipped { step, check } if verbose => writeln!(
                self.out,
                "{} ... {} {}",
                self.theme.highlight.apply_to(step.label),
                self.theme.dim.apply_to("skip"),
                self.theme.dim.apply_to(format!("({})", check.description))
            ),
            StepEvent::Skipped { step, .. } => writeln!(
                self.out,
                "{} ... {}",
                step.label,
                self.theme.dim.apply_to("skip")
            ),
            StepEvent::Finished { step, duration } if verbose => writeln!(
                self.out,
                "{} ... {} {}",
                self.theme.highlight.apply_to(step.label),
                self.theme.success.apply_to("done"),
                self.theme.dim.apply_to(format!("({:.1}s)", duration.as_secs_f64()))
            ),
            StepEvent::Finished { .. } => {
                writeln!(self.out, "{}", self.theme.success.apply_to("done"))
            }
            StepEvent::Failed { step, .. } if verbose => writeln!(
                self.out,
                "{} ... {}",
                self.theme.highlight.apply_to(step.label),
                self.theme.error.apply_to("error")
            ),
            StepEvent::Failed { .. } => {
                writeln!(self.out, "{}", self.theme.error.apply_to("error"))
            }
        };
        let _ = self.out.flush();
    }

    /// Render a dry-run plan.
    pub fn plan(&mut self, planned: &[PlannedStep]) {
        for step in planned {
            let verdict = match &step.check {
                Some(check) if check.complete => {
                    format!("skip ({})", check.description)
                }
                Some(check) => format!("run ({})", check.description),
                None => "run".to_string(),
            };
            let _ = writeln!(
                self.out,
                "{} ... {}\n  {}",
                self.theme.highlight.apply_to(step.label),
                self.theme.dim.apply_to(verdict),
                self.theme.command.apply_to(&step.action)
            );
        }
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{BuildState, BuildStep, CheckResult};
    use std::time::Duration;

    fn step() -> BuildStep {
        BuildStep {
            state: BuildState::CloningTools,
            label: "Cloning depot tools",
            dirs: Vec::new(),
            command: None,
            check: None,
            marker: None,
            on_success: BuildState::ConfiguringClient,
        }
    }

    fn render(mode: OutputMode, events: &[StepEvent<'_>]) -> String {
        let mut output = Output::new(mode, Theme::plain(), Vec::new());
        for event in events {
            output.step_event(event);
        }
        String::from_utf8(output.into_inner()).unwrap()
    }

    #[test]
    fn verbose_applies_only_to_normal_mode() {
        let mut normal = Output::new(OutputMode::Normal, Theme::plain(), Vec::new());
        normal.set_verbose(true);
        assert_eq!(normal.mode(), OutputMode::Verbose);

        let mut quiet = Output::new(OutputMode::Quiet, Theme::plain(), Vec::new());
        quiet.set_verbose(true);
        assert_eq!(quiet.mode(), OutputMode::Quiet);
    }

    #[test]
    fn normal_mode_completes_the_label_line() {
        let step = step();
        let text = render(
            OutputMode::Normal,
            &[
                StepEvent::Starting { step: &step },
                StepEvent::Finished {
                    step: &step,
                    duration: Duration::from_millis(10),
                },
            ],
        );
        assert_eq!(text, "Cloning depot tools ... done\n");
    }

    #[test]
    fn skip_line() {
        let step = step();
        let check = CheckResult::complete("depot_tools exists");
        let text = render(
            OutputMode::Normal,
            &[StepEvent::Skipped {
                step: &step,
                check: &check,
            }],
        );
        assert_eq!(text, "Cloning depot tools ... skip\n");
    }

    #[test]
    fn quiet_mode_shows_no_steps() {
        let step = step();
        let text = render(OutputMode::Quiet, &[StepEvent::Starting { step: &step }]);
        assert!(text.is_empty());
    }

    #[test]
    fn success_is_shown_even_when_quiet() {
        let mut output = Output::new(OutputMode::Quiet, Theme::plain(), Vec::new());
        output.success("Build complete");
        assert_eq!(
            String::from_utf8(output.into_inner()).unwrap(),
            "Build complete\n"
        );
    }
}
