//! Pipeline states and the forward transition table.

use std::fmt;

/// Where the pipeline is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildState {
    /// Nothing has happened yet.
    Idle,
    /// Creating the dependency root.
    PreparingDirs,
    /// Cloning depot_tools.
    CloningTools,
    /// Writing the gclient solution config.
    ConfiguringClient,
    /// Fetching sources at the pinned revision.
    Syncing,
    /// Running gclient hooks (build file generation).
    RunningHooks,
    /// Compiling with ninja.
    Building,
    /// Every step succeeded or was already done.
    Complete,
    /// A step failed; nothing after it ran.
    Failed,
}

/// Forward transitions taken on success. Any failure goes to [`BuildState::Failed`].
pub const TRANSITIONS: &[(BuildState, BuildState)] = &[
    (BuildState::Idle, BuildState::PreparingDirs),
    (BuildState::PreparingDirs, BuildState::CloningTools),
    (BuildState::CloningTools, BuildState::ConfiguringClient),
    (BuildState::ConfiguringClient, BuildState::Syncing),
    (BuildState::Syncing, BuildState::RunningHooks),
    (BuildState::RunningHooks, BuildState::Building),
    (BuildState::Building, BuildState::Complete),
];

impl BuildState {
    /// State a run starts in.
    pub fn entry(build_only: bool) -> Self {
        if build_only {
            BuildState::Building
        } else {
            BuildState::Idle
        }
    }

    /// Successor on success, `None` for terminal states.
    pub fn next(self) -> Option<Self> {
        TRANSITIONS
            .iter()
            .find(|(from, _)| *from == self)
            .map(|(_, to)| *to)
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, BuildState::Complete | BuildState::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuildState::Idle => "idle",
            BuildState::PreparingDirs => "preparing-dirs",
            BuildState::CloningTools => "cloning-tools",
            BuildState::ConfiguringClient => "configuring-client",
            BuildState::Syncing => "syncing",
            BuildState::RunningHooks => "running-hooks",
            BuildState::Building => "building",
            BuildState::Complete => "complete",
            BuildState::Failed => "failed",
        }
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_chain_from_idle_reaches_complete() {
        let mut chain = vec![BuildState::Idle];
        while let Some(next) = chain.last().unwrap().next() {
            chain.push(next);
        }
        assert_eq!(
            chain,
            [
                BuildState::Idle,
                BuildState::PreparingDirs,
                BuildState::CloningTools,
                BuildState::ConfiguringClient,
                BuildState::Syncing,
                BuildState::RunningHooks,
                BuildState::Building,
                BuildState::Complete,
            ]
        );
    }

    #[test]
    fn terminal_states_have_no_successor() {
        assert!(BuildState::Complete.is_terminal());
        assert!(BuildState::Failed.is_terminal());
        assert_eq!(BuildState::Complete.next(), None);
        assert_eq!(BuildState::Failed.next(), None);
    }

    #[test]
    fn every_non_terminal_state_has_one_successor() {
        for (from, _) in TRANSITIONS {
            assert!(!from.is_terminal());
            assert_eq!(TRANSITIONS.iter().filter(|(f, _)| f == from).count(), 1);
        }
    }

    #[test]
    fn build_only_enters_at_building() {
        assert_eq!(BuildState::entry(true), BuildState::Building);
        assert_eq!(BuildState::entry(false), BuildState::Idle);
    }
}
