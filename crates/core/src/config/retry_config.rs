//! Retry settings as written in the config file

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::{
    error::{Error, Result},
    runners::RetryPolicy,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_between_retries_secs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_delay_secs: Option<f64>,
    /// Extra `regex → description` entries
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub retryable_errors: BTreeMap<String, String>,
    /// Keep the built-in transient error table alongside `retryable_errors`
    #[serde(default = "default_true")]
    pub include_defaults: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: None,
            time_between_retries_secs: None,
            backoff_multiplier: None,
            max_delay_secs: None,
            retryable_errors: BTreeMap::new(),
            include_defaults: true,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> Result<RetryPolicy> {
        let mut policy = if self.include_defaults {
            RetryPolicy::default()
        } else {
            RetryPolicy::from_patterns(std::iter::empty::<(&str, &str)>())?
        };

        for (pattern, description) in &self.retryable_errors {
            policy = policy.with_pattern(pattern, description.as_str())?;
        }

        if let Some(max_retries) = self.max_retries {
            policy = policy.with_max_retries(max_retries);
        }
        if let Some(secs) = self.time_between_retries_secs {
            policy = policy.with_time_between_retries(seconds("time_between_retries_secs", secs)?);
        }

        let multiplier = self.backoff_multiplier.unwrap_or(policy.backoff_multiplier);
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(Error::ConfigError(format!(
                "backoff_multiplier must be at least 1.0, got {multiplier}"
            )));
        }
        let max_delay = match self.max_delay_secs {
            Some(secs) => seconds("max_delay_secs", secs)?,
            None => policy.max_delay,
        };

        Ok(policy.with_backoff(multiplier, max_delay))
    }
}

fn seconds(field: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|e| Error::ConfigError(format!("{field} is not a valid duration ({secs}): {e}")))
}
