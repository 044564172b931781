//! Per-target state machine
//!
//! `Pending → Initializing → FormatChecking → Validating → Passed`, with any
//! active state able to drop to `Failed`. The transition function is pure so
//! the short-circuit rules can be tested without running anything.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{error::StepError, types::Step};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    Pending,
    Initializing,
    FormatChecking,
    Validating,
    Passed,
    Failed { step: Step, cause: StepError },
}

/// What happened to the step of the current state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEvent {
    Start,
    Completed,
    Failed(StepError),
}

impl RunState {
    /// The state in which `step` is running
    pub fn running(step: Step) -> Self {
        match step {
            Step::Init => RunState::Initializing,
            Step::FormatCheck => RunState::FormatChecking,
            Step::Validate => RunState::Validating,
        }
    }

    /// Apply an event. Terminal states and events that make no sense for the
    /// current state leave the state unchanged.
    pub fn advance(self, event: StepEvent) -> RunState {
        match (self, event) {
            (RunState::Pending, StepEvent::Start) => RunState::running(Step::Init),
            (state, StepEvent::Completed) => match state.step() {
                Some(step) => step.next().map_or(RunState::Passed, RunState::running),
                None => state,
            },
            (state, StepEvent::Failed(cause)) => match state.step() {
                Some(step) => RunState::Failed { step, cause },
                None => state,
            },
            (state, StepEvent::Start) => state,
        }
    }

    /// The step being run, if the state is active
    pub fn step(&self) -> Option<Step> {
        match self {
            RunState::Initializing => Some(Step::Init),
            RunState::FormatChecking => Some(Step::FormatCheck),
            RunState::Validating => Some(Step::Validate),
            RunState::Pending | RunState::Passed | RunState::Failed { .. } => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Passed | RunState::Failed { .. })
    }

    pub fn failure(&self) -> Option<&StepError> {
        match self {
            RunState::Failed { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Pending => f.write_str("pending"),
            RunState::Initializing => f.write_str("initializing"),
            RunState::FormatChecking => f.write_str("format checking"),
            RunState::Validating => f.write_str("validating"),
            RunState::Passed => f.write_str("passed"),
            RunState::Failed { step, .. } => write!(f, "failed at {step}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fail(step: Step) -> StepEvent {
        StepEvent::Failed(StepError::new(step, Some(1), "error"))
    }

    #[test]
    fn test_happy_path_visits_every_step() {
        let mut state = RunState::Pending.advance(StepEvent::Start);
        let mut visited = Vec::new();
        while let Some(step) = state.step() {
            visited.push(step);
            state = state.advance(StepEvent::Completed);
        }
        assert_eq!(visited, Step::ALL);
        assert_eq!(state, RunState::Passed);
    }

    #[test]
    fn test_failure_short_circuits() {
        let state = RunState::FormatChecking.advance(fail(Step::FormatCheck));
        assert_eq!(state.step(), None);
        assert!(state.is_terminal());
        match state {
            RunState::Failed { step, ref cause } => {
                assert_eq!(step, Step::FormatCheck);
                assert_eq!(cause.step(), Step::FormatCheck);
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_terminal_states_absorb_events() {
        assert_eq!(RunState::Passed.advance(StepEvent::Completed), RunState::Passed);
        assert_eq!(RunState::Passed.advance(fail(Step::Validate)), RunState::Passed);

        let failed = RunState::Initializing.advance(fail(Step::Init));
        assert_eq!(failed.clone().advance(StepEvent::Completed), failed);
        assert_eq!(failed.clone().advance(StepEvent::Start), failed);
    }

    #[test]
    fn test_pending_only_accepts_start() {
        assert_eq!(RunState::Pending.advance(StepEvent::Completed), RunState::Pending);
        assert_eq!(RunState::Pending.advance(fail(Step::Init)), RunState::Pending);
        assert_eq!(
            RunState::Validating.advance(StepEvent::Start),
            RunState::Validating
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(RunState::Validating.to_string(), "validating");
        let failed = RunState::Validating.advance(fail(Step::Validate));
        assert_eq!(failed.to_string(), "failed at validate");
    }
}
