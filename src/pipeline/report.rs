//! Failure reporting.
//!
//! Turns a fatal error into the one diagnostic the operator sees and the
//! exit status the run ends with.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::BuildError;

/// Exit status for a run that reached `Failed`.
pub const FAILURE_EXIT_CODE: u8 = 255;

/// Exit status for options that could not be resolved.
pub const CONFIG_EXIT_CODE: u8 = 2;

/// Writes failure diagnostics that point at the build log.
pub struct ErrorReporter<W: Write> {
    log_path: PathBuf,
    out: W,
}

impl<W: Write> ErrorReporter<W> {
    /// Report to an arbitrary writer.
    pub fn new(log_path: impl Into<PathBuf>, out: W) -> Self {
        Self {
            log_path: log_path.into(),
            out,
        }
    }

    /// Emit the diagnostic for `error` and return the exit status to use.
    pub fn report(&mut self, error: &BuildError) -> u8 {
        let _ = writeln!(self.out, "{}", diagnostic(&self.log_path, error));
        let _ = self.out.flush();
        exit_code_for(error)
    }

    /// Get the writer back (for tests).
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// The diagnostic line for a fatal error.
pub fn diagnostic(log_path: &Path, error: &BuildError) -> String {
    if error.is_configuration() {
        format!("error: {}", error)
    } else {
        format!("error (see {} for details): {}", log_path.display(), error)
    }
}

/// Exit status for a fatal error.
pub fn exit_code_for(error: &BuildError) -> u8 {
    if error.is_configuration() {
        CONFIG_EXIT_CODE
    } else {
        FAILURE_EXIT_CODE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn tool_failure() -> BuildError {
        BuildError::ExternalToolFailed {
            step: "Syncing upstream libjingle".into(),
            command: "gclient sync -rr5459".into(),
            code: Some(1),
            signal: None,
        }
    }

    #[test]
    fn diagnostic_names_log_file() {
        let msg = diagnostic(Path::new("/work/build.log"), &tool_failure());
        assert!(msg.starts_with("error (see /work/build.log for details): "));
        assert!(msg.contains("Syncing upstream libjingle"));
    }

    #[test]
    fn report_writes_one_line_and_returns_failure_code() {
        let mut reporter = ErrorReporter::new("/work/build.log", Vec::new());

        let code = reporter.report(&tool_failure());
        let written = String::from_utf8(reporter.into_inner()).unwrap();

        assert_eq!(code, FAILURE_EXIT_CODE);
        assert_eq!(written.lines().count(), 1);
        assert!(written.contains("/work/build.log"));
    }

    #[test]
    fn unavailable_tool_uses_same_failure_path() {
        let err = BuildError::ExternalToolUnavailable {
            command: "gclient".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        };
        assert_eq!(exit_code_for(&err), FAILURE_EXIT_CODE);
        assert!(diagnostic(Path::new("build.log"), &err).contains("see build.log"));
    }

    #[test]
    fn configuration_errors_have_their_own_code() {
        let err = BuildError::InvalidOption {
            option: "--configuration".into(),
            value: "out/Release".into(),
            message: "must not contain a path separator".into(),
        };
        assert_eq!(exit_code_for(&err), CONFIG_EXIT_CODE);
        assert!(!diagnostic(Path::new("build.log"), &err).contains("build.log"));
    }
}
