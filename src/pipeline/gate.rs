//! Idempotency checks.
//!
//! A check decides whether a step's effect is already on disk and the step
//! can be skipped. Checks are evaluated once, right before the step would
//! otherwise run.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BuildError, Result};

/// Predicate deciding whether a step's effect already exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdempotencyCheck {
    /// The step produced this file or directory.
    PathExists(PathBuf),

    /// The pipeline wrote this stamp file after the step last succeeded.
    Marker(PathBuf),
}

/// Result of running an idempotency check.
///
/// The `description` field is user-visible: it appears in skip notices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// Whether the effect exists (step can be skipped).
    pub complete: bool,

    /// Description of what was checked.
    pub description: String,
}

impl CheckResult {
    /// Create a complete result.
    pub fn complete(description: impl Into<String>) -> Self {
        Self {
            complete: true,
            description: description.into(),
        }
    }

    /// Create an incomplete result.
    pub fn incomplete(description: impl Into<String>) -> Self {
        Self {
            complete: false,
            description: description.into(),
        }
    }
}

/// Run an idempotency check.
pub fn run_check(check: &IdempotencyCheck) -> CheckResult {
    match check {
        IdempotencyCheck::PathExists(path) => {
            if path.exists() {
                CheckResult::complete(format!("{} exists", path.display()))
            } else {
                CheckResult::incomplete(format!("{} missing", path.display()))
            }
        }
        IdempotencyCheck::Marker(path) => {
            if path.is_file() {
                CheckResult::complete(format!("marker {} present", display_name(path)))
            } else {
                CheckResult::incomplete(format!("marker {} absent", display_name(path)))
            }
        }
    }
}

/// Record that a marker-gated step succeeded.
pub fn write_marker(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, format!("{}\n", contents)).map_err(|e| BuildError::filesystem(path, e))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
