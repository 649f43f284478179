//! Error types for build pipeline operations.
//!
//! This module defines [`BuildError`], the error type used throughout the
//! crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Every variant is fatal to the run; nothing is retried locally
//! - Use `anyhow::Error` (via `BuildError::Other`) for unexpected errors
//! - Messages name the step or path involved so the operator can act on them

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for build operations.
#[derive(Debug, Error)]
pub enum BuildError {
    /// An external tool ran but exited non-zero or was killed by a signal.
    #[error("{step}: `{command}` {}", describe_exit(.code, .signal))]
    ExternalToolFailed {
        step: String,
        command: String,
        code: Option<i32>,
        signal: Option<i32>,
    },

    /// An external tool could not be launched at all.
    #[error("unable to launch `{command}`: {source}")]
    ExternalToolUnavailable {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A required directory or file could not be created or used.
    #[error("{}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An option value could not be understood.
    #[error("Invalid value '{value}' for {option}: {message}")]
    InvalidOption {
        option: String,
        value: String,
        message: String,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BuildError {
    /// Wrap an IO error with the path it concerns.
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from the operator's configuration rather than the run.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidOption { .. })
    }
}

fn describe_exit(code: &Option<i32>, signal: &Option<i32>) -> String {
    match (*code, *signal) {
        (_, Some(sig)) => format!("terminated by signal {}", sig),
        (Some(code), None) => format!("exited with code {}", code),
        (None, None) => "exited abnormally".to_string(),
    }
}

/// Result type alias for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_failed_displays_step_command_and_code() {
        let err = BuildError::ExternalToolFailed {
            step: "Syncing upstream libjingle".into(),
            command: "gclient sync".into(),
            code: Some(1),
            signal: None,
        };
        let msg = err.to_string();
        assert!(msg.contains("Syncing upstream libjingle"));
        assert!(msg.contains("gclient sync"));
        assert!(msg.contains("exited with code 1"));
    }

    #[test]
    fn tool_failed_prefers_signal() {
        let err = BuildError::ExternalToolFailed {
            step: "Building libjingle".into(),
            command: "ninja".into(),
            code: None,
            signal: Some(9),
        };
        assert!(err.to_string().contains("terminated by signal 9"));
    }

    #[test]
    fn tool_unavailable_displays_command() {
        let err = BuildError::ExternalToolUnavailable {
            command: "git".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("unable to launch `git`"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn filesystem_error_displays_path() {
        let err = BuildError::filesystem(
            "/tmp/third_party",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/third_party"));
        assert!(!err.is_configuration());
    }

    #[test]
    fn invalid_option_is_configuration() {
        let err = BuildError::InvalidOption {
            option: "--configuration".into(),
            value: "out/Release".into(),
            message: "must not contain a path separator".into(),
        };
        assert!(err.is_configuration());
        assert!(err.to_string().contains("out/Release"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: BuildError = io_err.into();
        assert!(matches!(err, BuildError::Io(_)));
    }
}
