//! Build context resolution.
//!
//! Every step of the pipeline reads from one [`BuildContext`], resolved once
//! at startup from the raw command-line options and the host defaults. The
//! context owns the directory layout and the environment handed to every
//! external tool, so nothing else in the crate recomputes paths or reads
//! `std::env`.
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
//!
//! let ctx = resolve(&options, &host, "/src/project").unwrap();
//! assert_eq!(ctx.gyp_defines(), "host_arch=x64 target_arch=arm");
//! assert_eq!(ctx.configuration(), "Release");
//! ```

pub mod host;

pub use host::{Arch, HostEnv, Os, BUILD_ONLY_ENV};

use std::path::{Path, PathBuf};

use crate::error::{BuildError, Result};

/// Upstream of the Chromium depot_tools checkout.
pub const DEPOT_TOOLS_REPO: &str =
    "https://chromium.googlesource.com/chromium/tools/depot_tools.git";

/// Upstream handed to `gclient config`.
pub const LIBWEBRTC_REPO: &str = "http://webrtc.googlecode.com/svn/trunk";

/// Known-good libwebrtc revision.
pub const DEFAULT_REVISION: &str = "r5459";

/// Build configuration used when none is given.
pub const DEFAULT_CONFIGURATION: &str = "Release";

/// The only build-file generator the pipeline drives.
pub const GENERATOR: &str = "ninja";

/// Log file name, relative to the project root.
pub const LOG_FILE: &str = "build.log";

/// Options as they arrive from the command line, before defaults apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOptions {
    /// Target architecture name.
    pub target_arch: Option<String>,

    /// Requested build-file generator.
    pub gyp_gen: Option<String>,

    /// Verbose output.
    pub verbose: bool,

    /// libwebrtc revision pin.
    pub revision: Option<String>,

    /// Build configuration name (e.g. Release, Debug).
    pub configuration: Option<String>,

    /// Direct-build shortcut requested on the command line.
    pub build_only: bool,
}

/// Immutable record of resolved configuration driving all steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    target_arch: Arch,
    host_arch: Arch,
    host_os: Os,
    configuration: String,
    revision: String,
    verbose: bool,
    build_only: bool,
    project_root: PathBuf,
    lib_dir: PathBuf,
    depot_tools_dir: PathBuf,
    webrtc_dir: PathBuf,
    log_path: PathBuf,
    search_path: String,
    gyp_defines: String,
}

impl BuildContext {
    /// Architecture the dependency is compiled for.
    pub fn target_arch(&self) -> &Arch {
        &self.target_arch
    }

    /// Architecture of the build machine.
    pub fn host_arch(&self) -> &Arch {
        &self.host_arch
    }

    /// Operating system of the build machine.
    pub fn host_os(&self) -> Os {
        self.host_os
    }

    /// Build configuration name, also the `out/` subdirectory ninja builds in.
    pub fn configuration(&self) -> &str {
        &self.configuration
    }

    /// Pinned libwebrtc revision.
    pub fn revision(&self) -> &str {
        &self.revision
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Whether the run starts directly at the build step.
    pub fn build_only(&self) -> bool {
        self.build_only
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Root of everything fetched (`<project>/third_party`).
    pub fn lib_dir(&self) -> &Path {
        &self.lib_dir
    }

    /// depot_tools checkout (`third_party/depot_tools`).
    pub fn depot_tools_dir(&self) -> &Path {
        &self.depot_tools_dir
    }

    /// gclient solution directory (`third_party/libwebrtc`).
    pub fn webrtc_dir(&self) -> &Path {
        &self.webrtc_dir
    }

    /// The single log file for the run.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// `PATH` with the depot_tools checkout in front.
    pub fn search_path(&self) -> &str {
        &self.search_path
    }

    /// Value of `GYP_GENERATORS`.
    pub fn gyp_generators(&self) -> &str {
        GENERATOR
    }

    /// Value of `GYP_DEFINES`, host architecture first.
    pub fn gyp_defines(&self) -> &str {
        &self.gyp_defines
    }

    /// Environment overrides handed to every external process, in a fixed order.
    pub fn env_overrides(&self) -> Vec<(String, String)> {
        vec![
            ("PATH".to_string(), self.search_path.clone()),
            ("GYP_GENERATORS".to_string(), GENERATOR.to_string()),
            ("GYP_DEFINES".to_string(), self.gyp_defines.clone()),
        ]
    }
}

/// Resolve raw options and host defaults into a [`BuildContext`].
///
/// Has no side effects: the same inputs always produce an identical context.
/// Empty option values count as absent, so defaults still apply.
pub fn resolve(
    options: &RawOptions,
    host: &HostEnv,
    project_root: impl Into<PathBuf>,
) -> Result<BuildContext> {
    let target_arch = match non_empty(&options.target_arch) {
        Some(name) => Arch::from_name(name),
        None => host.arch.clone(),
    };

    let configuration = non_empty(&options.configuration)
        .unwrap_or(DEFAULT_CONFIGURATION)
        .to_string();
    if configuration.contains(['/', '\\']) {
        return Err(BuildError::InvalidOption {
            option: "--configuration".to_string(),
            value: configuration,
            message: "must be a single directory name".to_string(),
        });
    }

    let revision = non_empty(&options.revision)
        .unwrap_or(DEFAULT_REVISION)
        .to_string();

    let project_root = project_root.into();
    let lib_dir = project_root.join("third_party");
    let depot_tools_dir = lib_dir.join("depot_tools");
    let webrtc_dir = lib_dir.join("libwebrtc");
    let log_path = project_root.join(LOG_FILE);

    let search_path = match host.path.as_deref() {
        Some(path) if !path.is_empty() => format!(
            "{}{}{}",
            depot_tools_dir.display(),
            host.os.path_separator(),
            path
        ),
        _ => depot_tools_dir.display().to_string(),
    };

    let gyp_defines = format!("host_arch={} target_arch={}", host.arch, target_arch);

    Ok(BuildContext {
        target_arch,
        host_arch: host.arch.clone(),
        host_os: host.os,
        configuration,
        revision,
        verbose: options.verbose,
        build_only: options.build_only || host.build_only,
        project_root,
        lib_dir,
        depot_tools_dir,
        webrtc_dir,
        log_path,
        search_path,
        gyp_defines,
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
