use serde::Serialize;
use std::fmt;

use super::ValidationTarget;
use crate::impl_case_insensitive_deserialize;

/// One of the three checks run against every target, in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Init,
    FormatCheck,
    Validate,
}

impl_case_insensitive_deserialize!(
    Step,
    Init => "init",
    FormatCheck => "format_check",
    Validate => "validate"
);

impl Step {
    /// The fixed sequence every target goes through
    pub const ALL: [Step; 3] = [Step::Init, Step::FormatCheck, Step::Validate];

    /// Arguments passed to the tool for this step
    pub fn args(self, target: &ValidationTarget) -> Vec<String> {
        match self {
            Step::Init => {
                let mut args = vec!["init".to_string(), "-input=false".to_string()];
                if target.backend_disabled {
                    args.push("-backend=false".to_string());
                }
                args
            }
            Step::FormatCheck => vec!["fmt".to_string(), "-check".to_string()],
            Step::Validate => vec!["validate".to_string()],
        }
    }

    /// Only `init` talks to registries and backends, so only `init` can fail transiently.
    pub fn is_retryable(self) -> bool {
        matches!(self, Step::Init)
    }

    pub fn next(self) -> Option<Step> {
        match self {
            Step::Init => Some(Step::FormatCheck),
            Step::FormatCheck => Some(Step::Validate),
            Step::Validate => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Init => "init",
            Step::FormatCheck => "fmt -check",
            Step::Validate => "validate",
        };
        f.write_str(name)
    }
}
