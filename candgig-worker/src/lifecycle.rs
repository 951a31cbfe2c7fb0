//! Worker lifecycle state machine.
//!
//! `Parsed -> Installing -> Installed (waiting) -> Activating -> Activated`,
//! with `Redundant` reachable from any state once the worker fails or is
//! replaced.

use candgig_core::{CandgigResult, LifecycleError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    Parsed,
    Installing,
    /// Installed and waiting for activation.
    Installed,
    Activating,
    Activated,
    Redundant,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        }
    }

    pub fn can_transition_to(self, next: WorkerState) -> bool {
        use WorkerState::*;
        matches!(
            (self, next),
            (Parsed, Installing)
                | (Installing, Installed)
                | (Installed, Activating)
                | (Activating, Activated)
                | (Parsed | Installing | Installed | Activating | Activated, Redundant)
        )
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow.
    pub fn transition(&mut self, next: WorkerState) -> CandgigResult<()> {
        if !self.can_transition_to(next) {
            return Err(LifecycleError::InvalidTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            }
            .into());
        }
        tracing::debug!(from = self.as_str(), to = next.as_str(), "Worker state changed");
        *self = next;
        Ok(())
    }
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candgig_core::CandgigError;

    #[test]
    fn test_happy_path() {
        let mut state = WorkerState::Parsed;
        for next in [
            WorkerState::Installing,
            WorkerState::Installed,
            WorkerState::Activating,
            WorkerState::Activated,
            WorkerState::Redundant,
        ] {
            state.transition(next).unwrap();
        }
        assert_eq!(state, WorkerState::Redundant);
    }

    #[test]
    fn test_cannot_skip_install() {
        let mut state = WorkerState::Parsed;
        let err = state.transition(WorkerState::Activating).unwrap_err();
        assert!(matches!(
            err,
            CandgigError::Lifecycle(LifecycleError::InvalidTransition { .. })
        ));
        assert_eq!(state, WorkerState::Parsed);
    }

    #[test]
    fn test_redundant_is_terminal() {
        let mut state = WorkerState::Redundant;
        assert!(state.transition(WorkerState::Installing).is_err());
        assert!(!WorkerState::Redundant.can_transition_to(WorkerState::Redundant));
    }
}
