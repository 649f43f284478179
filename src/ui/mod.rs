//! Terminal output.
//!
//! - [`Output`] renders pipeline progress and dry-run plans
//! - [`OutputMode`] selects how much is shown
//! - [`Theme`] holds the styles, plain when colors are off

pub mod output;
pub mod theme;

pub use output::{Output, OutputMode};
pub use theme::{should_use_colors, Theme};
