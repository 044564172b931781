//! Outcome records for single targets and whole suites

use serde::Serialize;
use std::time::Duration;

use super::RunState;
use crate::{
    command::CommandOutput,
    error::StepError,
    types::{Step, ValidationTarget},
    utils::serde_helpers::duration_ms,
};

/// One executed step, after any retries
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub step: Step,
    pub attempts: u32,
    #[serde(rename = "duration_ms", serialize_with = "duration_ms")]
    pub duration: Duration,
    /// Output of the last attempt
    pub output: CommandOutput,
}

impl StepRecord {
    pub fn succeeded(&self) -> bool {
        self.output.success()
    }

    pub fn retries(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetReport {
    pub target: ValidationTarget,
    pub state: RunState,
    /// Steps that actually ran, in order
    pub steps: Vec<StepRecord>,
    #[serde(rename = "duration_ms", serialize_with = "duration_ms")]
    pub duration: Duration,
}

impl TargetReport {
    pub fn passed(&self) -> bool {
        matches!(self.state, RunState::Passed)
    }

    pub fn failure(&self) -> Option<&StepError> {
        self.state.failure()
    }

    pub fn executed_steps(&self) -> Vec<Step> {
        self.steps.iter().map(|record| record.step).collect()
    }

    pub fn record(&self, step: Step) -> Option<&StepRecord> {
        self.steps.iter().find(|record| record.step == step)
    }

    pub fn into_result(self) -> Result<(), StepError> {
        match self.state {
            RunState::Failed { cause, .. } => Err(cause),
            _ => Ok(()),
        }
    }
}

/// Reports for every target, in configuration order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SuiteReport {
    pub reports: Vec<TargetReport>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.reports.iter().filter(|report| report.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.reports.len() - self.passed()
    }

    pub fn is_success(&self) -> bool {
        self.reports.iter().all(TargetReport::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &TargetReport> {
        self.reports.iter().filter(|report| !report.passed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runners::StepEvent;

    fn report(dir: &str, state: RunState) -> TargetReport {
        TargetReport {
            target: ValidationTarget::offline(dir),
            state,
            steps: Vec::new(),
            duration: Duration::from_millis(1200),
        }
    }

    #[test]
    fn test_suite_counts() {
        let failed = RunState::FormatChecking.advance(StepEvent::Failed(StepError::new(
            Step::FormatCheck,
            Some(3),
            "main.tf",
        )));
        let suite = SuiteReport {
            reports: vec![report("a", RunState::Passed), report("b", failed)],
        };

        assert_eq!(suite.passed(), 1);
        assert_eq!(suite.failed(), 1);
        assert!(!suite.is_success());
        let failures: Vec<_> = suite.failures().map(|r| r.target.label()).collect();
        assert_eq!(failures, vec!["b"]);
        assert!(SuiteReport::default().is_success());
    }

    #[test]
    fn test_report_serializes_state_and_duration() {
        let json = serde_json::to_value(report("terraform", RunState::Passed)).unwrap();
        assert_eq!(json["state"]["state"], "passed");
        assert_eq!(json["duration_ms"], 1200);
        assert_eq!(json["target"]["backend_disabled"], true);
    }

    #[test]
    fn test_into_result() {
        assert!(report("a", RunState::Passed).into_result().is_ok());

        let cause = StepError::new(Step::Init, Some(1), "no such file");
        let failed = report(
            "a",
            RunState::Failed {
                step: Step::Init,
                cause: cause.clone(),
            },
        );
        assert_eq!(failed.into_result(), Err(cause));
    }
}
