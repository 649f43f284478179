//! External process execution.
//!
//! - [`Invocation`] - program, argument vector, working directory, environment
//! - [`ProcessResult`] - exit code or terminating signal
//! - [`ProcessRunner`] - the seam the pipeline launches processes through
//! - [`SystemRunner`] - spawns real child processes, no shell involved
//! - [`MockRunner`] - records invocations and replays scripted results

pub mod command;
pub mod mock;
pub mod runner;

pub use command::{Invocation, ProcessResult};
pub use mock::{MockOutcome, MockRunner};
pub use runner::{ProcessRunner, SystemRunner};
