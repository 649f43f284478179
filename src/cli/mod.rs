//! Command-line interface.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`build`] - The build command wiring context, pipeline and output

pub mod args;
pub mod build;

pub use args::{retain_known_args, Cli};
pub use build::{project_root, BuildCommand, CommandResult};
