//! Command descriptions and exit results.

use std::path::PathBuf;
use std::process::ExitStatus;

/// One external program launch: program, discrete arguments, working
/// directory and environment overrides.
///
/// Arguments are kept as separate tokens all the way to the OS; nothing is
/// ever joined and re-split by a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name, looked up on the child's `PATH`.
    pub program: String,

    /// Argument vector, excluding the program itself.
    pub args: Vec<String>,

    /// Working directory.
    pub cwd: PathBuf,

    /// Environment variables set on top of the inherited environment.
    pub env: Vec<(String, String)>,
}

impl Invocation {
    /// Create an invocation with no arguments.
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            env: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set environment overrides.
    pub fn envs(mut self, env: Vec<(String, String)>) -> Self {
        self.env = env;
        self
    }

    /// Render the command for logs and messages.
    ///
    /// Tokens that a POSIX shell would treat specially are single-quoted so
    /// the rendering reads unambiguously. The result is never executed.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote(token: &str) -> String {
    const SPECIAL: &[char] = &[
        ' ', '\t', '\n', ';', '&', '|', '<', '>', '(', ')', '$', '`', '\\', '"', '\'', '*', '?',
        '[', ']', '#', '~', '{', '}',
    ];
    if token.is_empty() {
        "''".to_string()
    } else if token.contains(SPECIAL) {
        format!("'{}'", token.replace('\'', r"'\''"))
    } else {
        token.to_string()
    }
}

/// How an external process ended.
///
/// Exactly one of `code` and `signal` is set for a process that actually ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessResult {
    /// Exit code (None if killed by signal).
    pub code: Option<i32>,

    /// Terminating signal (None if the process exited on its own).
    pub signal: Option<i32>,
}

impl ProcessResult {
    /// A clean exit with the given code.
    pub fn exited(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    /// Termination by signal.
    pub fn signaled(signal: i32) -> Self {
        Self {
            code: None,
            signal: Some(signal),
        }
    }

    /// Whether the process exited cleanly with code 0.
    pub fn success(&self) -> bool {
        self.code == Some(0) && self.signal.is_none()
    }
}

impl From<ExitStatus> for ProcessResult {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self {
            code: status.code(),
            signal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_tokens_separate() {
        let inv = Invocation::new("gclient", "/tmp")
            .arg("sync")
            .args(["-f", "-r5459"]);
        assert_eq!(inv.args, ["sync", "-f", "-r5459"]);
    }

    #[test]
    fn command_line_plain_tokens() {
        let inv = Invocation::new("ninja", "/tmp").args(["-C", "trunk/out/Release"]);
        assert_eq!(inv.command_line(), "ninja -C trunk/out/Release");
    }

    #[test]
    fn command_line_quotes_metacharacters() {
        let inv = Invocation::new("echo", "/tmp").args(["a; rm -rf /", "it's", ""]);
        assert_eq!(inv.command_line(), r"echo 'a; rm -rf /' 'it'\''s' ''");
    }

    #[test]
    fn success_requires_zero_and_no_signal() {
        assert!(ProcessResult::exited(0).success());
        assert!(!ProcessResult::exited(1).success());
        assert!(!ProcessResult::signaled(9).success());
        assert!(!ProcessResult {
            code: None,
            signal: None
        }
        .success());
    }
}
