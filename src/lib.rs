//! wrtc-build - Fetch and build libwebrtc.
//!
//! wrtc-build clones depot_tools, configures and syncs a libwebrtc checkout
//! with gclient, runs its hooks and compiles it with ninja. Steps whose
//! result already exists on disk are skipped, so re-running over a prepared
//! tree only rebuilds.
//!
//! # Modules
//!
//! - [`build_log`] - The single log file all steps write into
//! - [`cli`] - Command-line interface and argument parsing
//! - [`context`] - Host detection and the immutable build context
//! - [`error`] - Error types and result aliases
//! - [`pipeline`] - Step table, idempotency checks and the sequencer
//! - [`process`] - External command execution
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```
//! use wrtc_build::context::{resolve, Arch, HostEnv, Os, RawOptions};
//!
//! let host = HostEnv {
//!     arch: Arch::X64,
//!     os: Os::Linux,
//!     path: Some("/usr/bin".to_string()),
//!     build_only: false,
//! };
//! let options = RawOptions {
//!     target_arch: Some("arm".to_string()),
//!     ..Default::default()
//! };
//! let ctx = resolve(&options, &host, "/work/app").unwrap();
//! assert_eq!(ctx.gyp_defines(), "host_arch=x64 target_arch=arm");
//! ```

pub mod build_log;
pub mod cli;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod process;
pub mod ui;

pub use error::{BuildError, Result};
