//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct. Unknown options are dropped
//! by [`retain_known_args`] before clap sees them.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::context::RawOptions;

/// wrtc-build - Fetch and build libwebrtc.
#[derive(Debug, Parser)]
#[command(name = "wrtc-build")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Target architecture, e.g. ia32, x64, arm, arm64 (default: host)
    #[arg(short, long, value_name = "ARCH")]
    pub target_arch: Option<String>,

    /// Shorthand for --target-arch ia32
    #[arg(long)]
    pub ia32: bool,

    /// Shorthand for --target-arch x64
    #[arg(long)]
    pub x64: bool,

    /// Shorthand for --target-arch arm
    #[arg(long)]
    pub arm: bool,

    /// Build-file generator (only ninja is supported)
    #[arg(long, value_name = "GENERATOR")]
    pub gyp_gen: Option<String>,

    /// Shorthand for --gyp-gen ninja
    #[arg(long)]
    pub ninja: bool,

    /// libwebrtc revision to sync
    #[arg(long, value_name = "REV")]
    pub libwebrtc_revision: Option<String>,

    /// Build configuration (default: Release)
    #[arg(long, value_name = "NAME")]
    pub configuration: Option<String>,

    /// Path to project root (overrides current directory)
    #[arg(short, long)]
    pub project: Option<PathBuf>,

    /// Skip straight to the build step (also set by a non-empty WRTC_BUILD_ONLY)
    #[arg(long)]
    pub build_only: bool,

    /// Print what would run without executing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Parse the process arguments, ignoring options this tool does not know.
    pub fn parse_lenient() -> Self {
        Self::parse_from(retain_known_args(std::env::args_os()))
    }

    /// Target architecture after applying the `--ia32`/`--x64`/`--arm` shorthands.
    ///
    /// An explicit `--target-arch` wins over a shorthand.
    pub fn resolved_target_arch(&self) -> Option<String> {
        if self.target_arch.is_some() {
            return self.target_arch.clone();
        }
        [(self.ia32, "ia32"), (self.x64, "x64"), (self.arm, "arm")]
            .into_iter()
            .find(|(set, _)| *set)
            .map(|(_, arch)| arch.to_string())
    }

    /// Raw options for the context resolver.
    pub fn raw_options(&self) -> RawOptions {
        RawOptions {
            target_arch: self.resolved_target_arch(),
            gyp_gen: self
                .gyp_gen
                .clone()
                .or_else(|| self.ninja.then(|| "ninja".to_string())),
            verbose: self.verbose,
            revision: self.libwebrtc_revision.clone(),
            configuration: self.configuration.clone(),
            build_only: self.build_only,
        }
    }
}

/// Options that consume the following token as their value.
const VALUE_OPTIONS: &[&str] = &[
    "-t",
    "--target-arch",
    "--gyp-gen",
    "--libwebrtc-revision",
    "--configuration",
    "-p",
    "--project",
];

/// Options that stand alone.
const FLAG_OPTIONS: &[&str] = &[
    "--ia32",
    "--x64",
    "--arm",
    "--ninja",
    "--build-only",
    "--dry-run",
    "-v",
    "--verbose",
    "-q",
    "--quiet",
    "--debug",
    "-h",
    "--help",
    "-V",
    "--version",
];

/// Drop arguments this tool does not recognize.
///
/// The first element (the program name) is always kept. Known options keep
/// their values, in both `--opt value` and `--opt=value` form, and short
/// value options may carry their value attached (`-tx64`). Anything else,
/// including stray positional words, is discarded.
pub fn retain_known_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut iter = args.into_iter().map(Into::<OsString>::into);
    let mut kept: Vec<OsString> = iter.next().into_iter().collect();

    while let Some(arg) = iter.next() {
        let Some(text) = arg.to_str() else {
            tracing::debug!("Ignoring non-UTF-8 argument {:?}", arg);
            continue;
        };

        if FLAG_OPTIONS.contains(&text) {
            kept.push(arg);
        } else if VALUE_OPTIONS.contains(&text) {
            kept.push(arg);
            if let Some(value) = iter.next() {
                kept.push(value);
            }
        } else if let Some((name, _)) = text.split_once('=') {
            if VALUE_OPTIONS.contains(&name) || FLAG_OPTIONS.contains(&name) {
                kept.push(arg);
            } else {
                tracing::debug!("Ignoring unknown option {}", text);
            }
        } else if is_attached_short(text) {
            kept.push(arg);
        } else {
            tracing::debug!("Ignoring unknown argument {}", text);
        }
    }

    kept
}

fn is_attached_short(text: &str) -> bool {
    !text.starts_with("--")
        && text.len() > 2
        && VALUE_OPTIONS
            .iter()
            .filter(|opt| opt.len() == 2)
            .any(|opt| text.starts_with(opt))
}
