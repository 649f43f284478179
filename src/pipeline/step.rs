//! The fixed step table.

use std::path::PathBuf;

use crate::context::{BuildContext, Os, DEPOT_TOOLS_REPO, LIBWEBRTC_REPO};
use crate::process::Invocation;

use super::gate::IdempotencyCheck;
use super::state::BuildState;

/// One unit of pipeline work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStep {
    /// State the step is the entry action of.
    pub state: BuildState,

    /// Progress label, also used as the log section title.
    pub label: &'static str,

    /// Directories created (if missing) before the command runs.
    pub dirs: Vec<PathBuf>,

    /// External command, if the step runs one.
    pub command: Option<Invocation>,

    /// Skip the step when this reports complete.
    pub check: Option<IdempotencyCheck>,

    /// Stamp written after the step succeeds.
    pub marker: Option<PathBuf>,

    /// State entered when the step succeeds or is skipped.
    pub on_success: BuildState,
}

impl BuildStep {
    fn new(state: BuildState, label: &'static str) -> Self {
        Self {
            state,
            label,
            dirs: Vec::new(),
            command: None,
            check: None,
            marker: None,
            on_success: state.next().unwrap_or(BuildState::Complete),
        }
    }

    fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dirs.push(dir.into());
        self
    }

    fn command(mut self, invocation: Invocation) -> Self {
        self.command = Some(invocation);
        self
    }

    fn check(mut self, check: IdempotencyCheck) -> Self {
        self.check = Some(check);
        self
    }

    fn marker(mut self, path: PathBuf) -> Self {
        self.check = Some(IdempotencyCheck::Marker(path.clone()));
        self.marker = Some(path);
        self
    }

    /// What the step does, for logs and dry runs.
    pub fn describe(&self) -> String {
        match &self.command {
            Some(invocation) => invocation.command_line(),
            None => self
                .dirs
                .iter()
                .map(|d| format!("mkdir {}", d.display()))
                .collect::<Vec<_>>()
                .join(" && "),
        }
    }
}

/// Build the step table for a context, in execution order.
///
/// Every state with an entry action appears exactly once. `Idle` and the
/// terminal states have no step.
pub fn pipeline_steps(ctx: &BuildContext) -> Vec<BuildStep> {
    let env = ctx.env_overrides();
    let tool = |program: &str, cwd: PathBuf| Invocation::new(program, cwd).envs(env.clone());

    let mut build = tool("ninja", ctx.webrtc_dir().to_path_buf())
        .args(["-C".to_string(), format!("trunk/out/{}", ctx.configuration())]);
    if ctx.host_os() == Os::Linux {
        build = build.arg("peerconnection_client");
    }

    vec![
        BuildStep::new(BuildState::PreparingDirs, "Preparing directories")
            .dir(ctx.lib_dir())
            .check(IdempotencyCheck::PathExists(ctx.lib_dir().to_path_buf())),
        BuildStep::new(BuildState::CloningTools, "Cloning depot tools")
            .command(
                tool("git", ctx.lib_dir().to_path_buf())
                    .args(["clone", "-v", "--progress", DEPOT_TOOLS_REPO, "depot_tools"]),
            )
            .check(IdempotencyCheck::PathExists(
                ctx.depot_tools_dir().to_path_buf(),
            )),
        BuildStep::new(BuildState::ConfiguringClient, "Configuring gclient")
            .dir(ctx.webrtc_dir())
            .command(tool("gclient", ctx.webrtc_dir().to_path_buf()).args(["config", LIBWEBRTC_REPO]))
            .check(IdempotencyCheck::PathExists(ctx.webrtc_dir().join(".gclient"))),
        BuildStep::new(BuildState::Syncing, "Syncing upstream libjingle")
            .command(tool("gclient", ctx.webrtc_dir().to_path_buf()).args([
                "sync".to_string(),
                "-f".to_string(),
                "-n".to_string(),
                "-D".to_string(),
                "-j1".to_string(),
                format!("-r{}", ctx.revision()),
            ]))
            .marker(sync_marker(ctx)),
        BuildStep::new(BuildState::RunningHooks, "Executing runhooks")
            .command(tool("gclient", ctx.webrtc_dir().to_path_buf()).args(["runhooks", "-j1"])),
        BuildStep::new(BuildState::Building, "Building libjingle").command(build),
    ]
}

/// Stamp recording a completed sync of the pinned revision.
pub fn sync_marker(ctx: &BuildContext) -> PathBuf {
    ctx.webrtc_dir()
        .join(format!(".wrtc-sync-{}", ctx.revision()))
}
