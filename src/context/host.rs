//! Host detection.
//!
//! Architectures are named the way the libwebrtc build files name them
//! (`ia32`, `x64`, `arm`, `arm64`), not the way Rust targets do.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Environment variable that selects the direct-build shortcut.
pub const BUILD_ONLY_ENV: &str = "WRTC_BUILD_ONLY";

/// CPU architecture as understood by the dependency's build system.
///
/// Names outside the known set are carried through verbatim so gyp sees
/// exactly what the operator or the host reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arch {
    Ia32,
    X64,
    Arm,
    Arm64,
    Other(String),
}

impl Arch {
    /// Architecture of the running binary.
    pub fn current() -> Self {
        Self::from_rust_arch(std::env::consts::ARCH)
    }

    /// Map a Rust `target_arch` name onto the build system's vocabulary.
    pub fn from_rust_arch(arch: &str) -> Self {
        Self::from_name(arch)
    }

    /// Normalize the known aliases; keep anything else as given.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "ia32" | "x86" => Arch::Ia32,
            "x64" | "x86_64" => Arch::X64,
            "arm" => Arch::Arm,
            "arm64" | "aarch64" => Arch::Arm64,
            _ => Arch::Other(name.to_string()),
        }
    }

    /// Name used in `GYP_DEFINES` and on the command line.
    pub fn as_str(&self) -> &str {
        match self {
            Arch::Ia32 => "ia32",
            Arch::X64 => "x64",
            Arch::Arm => "arm",
            Arch::Arm64 => "arm64",
            Arch::Other(name) => name,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

/// Host operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Linux,
    Darwin,
    Windows,
    Other,
}

impl Os {
    /// Operating system of the running binary.
    pub const fn current() -> Self {
        if cfg!(target_os = "linux") {
            Os::Linux
        } else if cfg!(target_os = "macos") {
            Os::Darwin
        } else if cfg!(target_os = "windows") {
            Os::Windows
        } else {
            Os::Other
        }
    }

    /// Separator between entries of `PATH`.
    pub const fn path_separator(&self) -> char {
        match self {
            Os::Windows => ';',
            _ => ':',
        }
    }
}

/// Everything the resolver needs to know about the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnv {
    /// Architecture of the build machine.
    pub arch: Arch,

    /// Operating system of the build machine.
    pub os: Os,

    /// Current value of `PATH`, if any.
    pub path: Option<String>,

    /// Whether the direct-build shortcut was requested through the environment.
    pub build_only: bool,
}

impl HostEnv {
    /// Detect host defaults from the running process.
    pub fn detect() -> Self {
        Self::detect_with_env(|key| std::env::var(key))
    }

    /// Detect with a custom env var lookup (for testing).
    pub fn detect_with_env<F>(env_fn: F) -> Self
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        Self {
            arch: Arch::current(),
            os: Os::current(),
            path: env_fn("PATH").ok(),
            build_only: env_fn(BUILD_ONLY_ENV)
                .map(|v| !v.is_empty())
                .unwrap_or(false),
        }
    }
}
