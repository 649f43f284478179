//! Dry-run planning.

use crate::context::BuildContext;

use super::gate::{run_check, CheckResult};
use super::state::BuildState;
use super::step::pipeline_steps;

/// What a run would do at one step, given the tree as it is now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    pub state: BuildState,
    pub label: &'static str,
    /// Command or directory action the step performs.
    pub action: String,
    /// Current gate verdict, if the step has a gate.
    pub check: Option<CheckResult>,
}

impl PlannedStep {
    /// Whether the step would be skipped if the run started now.
    pub fn would_skip(&self) -> bool {
        self.check.as_ref().is_some_and(|c| c.complete)
    }
}

/// List the steps a run would reach from its entry state, without executing
/// anything or touching the log.
///
/// Gate verdicts reflect the current tree. Later steps whose gates depend on
/// earlier steps' effects may change once those steps run.
pub fn plan(ctx: &BuildContext) -> Vec<PlannedStep> {
    let entry = BuildState::entry(ctx.build_only());
    pipeline_steps(ctx)
        .into_iter()
        .skip_while(|step| step.state != entry && entry != BuildState::Idle)
        .map(|step| PlannedStep {
            state: step.state,
            label: step.label,
            action: step.describe(),
            check: step.check.as_ref().map(run_check),
        })
        .collect()
}
