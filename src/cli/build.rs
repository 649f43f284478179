//! Build command implementation.
//!
//! Resolves the context, then either prints the dry-run plan or drives the
//! sequencer and turns its report into an exit status.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::cli::args::Cli;
use crate::context::{resolve, HostEnv, RawOptions, GENERATOR, LOG_FILE};
use crate::error::{BuildError, Result};
use crate::pipeline::{plan, ErrorReporter, Sequencer, FAILURE_EXIT_CODE};
use crate::process::ProcessRunner;
use crate::ui::Output;

/// Result of command execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: u8,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: u8) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Absolute project root from `--project` and the current directory.
///
/// Child processes run in other directories, so a relative root is joined
/// onto `cwd`. An absolute `--project` does not need `cwd` at all.
pub fn project_root(project: Option<&Path>, cwd: io::Result<PathBuf>) -> Result<PathBuf> {
    match project {
        Some(path) if path.is_absolute() => Ok(path.to_path_buf()),
        _ => {
            let cwd = cwd.map_err(|e| BuildError::filesystem(".", e))?;
            Ok(project.map(|p| cwd.join(p)).unwrap_or(cwd))
        }
    }
}

/// The build command.
pub struct BuildCommand {
    project_root: PathBuf,
    options: RawOptions,
    dry_run: bool,
}

impl BuildCommand {
    /// Create a build command from parsed arguments.
    pub fn new(project_root: &Path, cli: &Cli) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            options: cli.raw_options(),
            dry_run: cli.dry_run,
        }
    }

    /// Create a build command from raw options.
    pub fn with_options(project_root: &Path, options: RawOptions, dry_run: bool) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            options,
            dry_run,
        }
    }

    /// Execute the command.
    ///
    /// Progress goes to `output`; the failure diagnostic, if any, goes to `errors`.
    pub fn execute<W: Write>(
        &self,
        host: &HostEnv,
        runner: &mut dyn ProcessRunner,
        output: &mut Output<W>,
        errors: &mut dyn Write,
    ) -> CommandResult {
        let ctx = match resolve(&self.options, host, &self.project_root) {
            Ok(ctx) => ctx,
            Err(e) => {
                let code =
                    ErrorReporter::new(self.project_root.join(LOG_FILE), errors).report(&e);
                return CommandResult::failure(code);
            }
        };

        output.set_verbose(ctx.verbose());
        runner.set_echo(output.mode().shows_command_output());

        if let Some(generator) = self.options.gyp_gen.as_deref() {
            if generator != GENERATOR {
                output.warning(&format!(
                    "Generator '{}' is not supported; using {}",
                    generator, GENERATOR
                ));
            }
        }

        output.println(&format!(
            "libwebrtc {} for {} (host {}), {}",
            ctx.revision(),
            ctx.target_arch(),
            ctx.host_arch(),
            ctx.configuration()
        ));

        if self.dry_run {
            output.println("Dry run: no commands will be executed");
            output.plan(&plan(&ctx));
            return CommandResult::success();
        }

        let report =
            Sequencer::new(&ctx, runner).run_with_progress(|event| output.step_event(&event));

        if report.success() {
            output.success(&format!(
                "Build complete in {:.1}s",
                report.duration.as_secs_f64()
            ));
            return CommandResult::success();
        }

        let code = match &report.error {
            Some(e) => ErrorReporter::new(ctx.log_path(), errors).report(e),
            None => FAILURE_EXIT_CODE,
        };
        CommandResult::failure(code)
    }
}
