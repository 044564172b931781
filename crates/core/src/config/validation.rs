//! Configuration validation, run before any target is checked

use std::collections::HashSet;

use super::Config;
use crate::error::{Error, Result};

/// Reject configs that would make the run meaningless or ambiguous
pub fn validate_config(config: &Config) -> Result<()> {
    let mut problems = Vec::new();

    if config.targets.is_empty() {
        problems.push("no targets configured".to_string());
    }

    if config.jobs == Some(0) {
        problems.push("jobs must be at least 1".to_string());
    }

    if config.timeout_secs == Some(0) {
        problems.push("timeout_secs must be at least 1".to_string());
    }

    if let Some(ref binary) = config.terraform_binary {
        if binary.trim().is_empty() {
            problems.push("terraform_binary is empty".to_string());
        }
    }

    let mut names = HashSet::new();
    for (index, target) in config.targets.iter().enumerate() {
        if target.dir.as_os_str().is_empty() {
            problems.push(format!("target #{} has an empty dir", index + 1));
        }
        if let Some(ref name) = target.name {
            if !names.insert(name.as_str()) {
                problems.push(format!("target name '{name}' is used more than once"));
            }
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::ConfigError(problems.join("; ")))
    }
}
