use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crate::types::Step;

/// Errors that can occur while preparing or executing tool commands
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to start `{program}`: {source}")]
    SpawnError {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The command was killed at its deadline; `stdout`/`stderr` hold what it
    /// printed before that
    #[error("`{command}` timed out after {timeout:?}")]
    Timeout {
        command: String,
        timeout: Duration,
        stdout: String,
        stderr: String,
    },

    #[error("Invalid retry pattern: {0}")]
    PatternError(#[from] regex::Error),

    #[error("Invalid JSON in {}: {source}", path.display())]
    SerializationError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for tfcheck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Why a target failed, tagged with the step that produced it.
///
/// Unlike [`Error`], these are expected outcomes and end up in reports.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepError {
    #[error("init failed ({})", exit_label(.exit_code))]
    InitError {
        exit_code: Option<i32>,
        output: String,
    },

    #[error("fmt -check found unformatted files ({})", exit_label(.exit_code))]
    FormatError {
        exit_code: Option<i32>,
        output: String,
    },

    #[error("validate failed ({})", exit_label(.exit_code))]
    ValidationError {
        exit_code: Option<i32>,
        output: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code".to_string(),
    }
}

impl StepError {
    pub fn new(step: Step, exit_code: Option<i32>, output: impl Into<String>) -> Self {
        let output = output.into();
        match step {
            Step::Init => Self::InitError { exit_code, output },
            Step::FormatCheck => Self::FormatError { exit_code, output },
            Step::Validate => Self::ValidationError { exit_code, output },
        }
    }

    /// The step this error originated from
    pub fn step(&self) -> Step {
        match self {
            Self::InitError { .. } => Step::Init,
            Self::FormatError { .. } => Step::FormatCheck,
            Self::ValidationError { .. } => Step::Validate,
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::InitError { exit_code, .. }
            | Self::FormatError { exit_code, .. }
            | Self::ValidationError { exit_code, .. } => *exit_code,
        }
    }

    /// Captured tool output (stdout followed by stderr)
    pub fn output(&self) -> &str {
        match self {
            Self::InitError { output, .. }
            | Self::FormatError { output, .. }
            | Self::ValidationError { output, .. } => output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_error_kind_follows_step() {
        for step in Step::ALL {
            let err = StepError::new(step, Some(1), "boom");
            assert_eq!(err.step(), step);
            assert_eq!(err.exit_code(), Some(1));
            assert_eq!(err.output(), "boom");
        }
    }

    #[test]
    fn test_step_error_display() {
        let err = StepError::new(Step::FormatCheck, Some(3), "main.tf\n");
        assert_eq!(
            err.to_string(),
            "fmt -check found unformatted files (exit code 3)"
        );

        let err = StepError::new(Step::Init, None, "");
        assert_eq!(err.to_string(), "init failed (no exit code)");
    }

    #[test]
    fn test_step_error_serialization() {
        let err = StepError::new(Step::Validate, Some(1), "Reference to undeclared input variable");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "validation_error");
        assert_eq!(json["exit_code"], 1);

        let back: StepError = serde_json::from_value(json).unwrap();
        assert_eq!(back, err);
    }
}
