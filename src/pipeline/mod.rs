//! Build-step orchestration.
//!
//! This module provides the core of the tool:
//!
//! - [`BuildState`] - pipeline states and the forward [`TRANSITIONS`] table
//! - [`BuildStep`] / [`pipeline_steps`] - the fixed, compiled-in step table
//! - [`run_check`] - idempotency checks that let re-runs skip finished work
//! - [`Sequencer`] - the driver loop, fail-fast on the first error
//! - [`ErrorReporter`] - the diagnostic and exit status on failure
//! - [`plan`] - what a run would do, for `--dry-run`
//!
//! # Example
//!
//! ```
//! use wrtc_build::context::{resolve, Arch, HostEnv, Os, RawOptions};
//! use wrtc_build::pipeline::{BuildState, Sequencer};
//! use wrtc_build::process::MockRunner;
//!
//! let root = tempfile::tempdir().unwrap();
//! let host = HostEnv { arch: Arch::X64, os: Os::Linux, path: None, build_only: true };
//! let ctx = resolve(&RawOptions::default(), &host, root.path()).unwrap();
//!
//! let mut runner = MockRunner::new();
//! let report = Sequencer::new(&ctx, &mut runner).run();
//!
//! assert_eq!(report.final_state, BuildState::Complete);
//! assert_eq!(report.visited, [BuildState::Building]);
//! ```

pub mod gate;
pub mod plan;
pub mod report;
pub mod sequencer;
pub mod state;
pub mod step;

pub use gate::{run_check, write_marker, CheckResult, IdempotencyCheck};
pub use plan::{plan, PlannedStep};
pub use report::{
    diagnostic, exit_code_for, ErrorReporter, CONFIG_EXIT_CODE, FAILURE_EXIT_CODE,
};
pub use sequencer::{RunReport, Sequencer, StepEvent, StepOutcome, StepRecord};
pub use state::{BuildState, TRANSITIONS};
pub use step::{pipeline_steps, sync_marker, BuildStep};
