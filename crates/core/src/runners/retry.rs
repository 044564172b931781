//! Classification of transient tool failures

use regex::Regex;
use std::time::Duration;

use crate::error::Result;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_TIME_BETWEEN_RETRIES: Duration = Duration::from_secs(5);
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

const NETWORK_PLUGIN_ERROR: &str = "Failed to retrieve plugin due to transient network error.";

/// Output patterns known to come from flaky networks or registries rather than
/// from the configuration under test.
pub const DEFAULT_RETRYABLE_ERRORS: &[(&str, &str)] = &[
    (".*read: connection reset by peer.*", "Failed to reach helm charts repository."),
    (".*transport is closing.*", "Failed to reach Kubernetes API."),
    (".*unable to verify signature.*", NETWORK_PLUGIN_ERROR),
    (".*unable to verify checksum.*", NETWORK_PLUGIN_ERROR),
    (".*no provider exists with the given name.*", NETWORK_PLUGIN_ERROR),
    (".*registry service is unreachable.*", NETWORK_PLUGIN_ERROR),
    (".*Error installing provider.*", NETWORK_PLUGIN_ERROR),
    (".*Failed to query available provider packages.*", NETWORK_PLUGIN_ERROR),
    (".*timeout while waiting for plugin to start.*", NETWORK_PLUGIN_ERROR),
    (".*timed out waiting for server handshake.*", NETWORK_PLUGIN_ERROR),
    ("could not query provider registry for", NETWORK_PLUGIN_ERROR),
];

/// Which failures are worth retrying, how often and how long to wait
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    retryable_errors: Vec<(Regex, String)>,
    pub max_retries: u32,
    pub time_between_retries: Duration,
    pub backoff_multiplier: f64,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        let retryable_errors = DEFAULT_RETRYABLE_ERRORS
            .iter()
            .filter_map(|(pattern, description)| {
                Regex::new(pattern)
                    .ok()
                    .map(|regex| (regex, (*description).to_string()))
            })
            .collect();

        Self {
            retryable_errors,
            max_retries: DEFAULT_MAX_RETRIES,
            time_between_retries: DEFAULT_TIME_BETWEEN_RETRIES,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            retryable_errors: Vec::new(),
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Default timings with only the given `pattern → description` table
    pub fn from_patterns<I, K, V>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut policy = Self {
            retryable_errors: Vec::new(),
            ..Self::default()
        };
        for (pattern, description) in patterns {
            policy = policy.with_pattern(pattern.as_ref(), description)?;
        }
        Ok(policy)
    }

    pub fn with_pattern(mut self, pattern: &str, description: impl Into<String>) -> Result<Self> {
        self.retryable_errors
            .push((Regex::new(pattern)?, description.into()));
        Ok(self)
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_time_between_retries(mut self, delay: Duration) -> Self {
        self.time_between_retries = delay;
        self
    }

    pub fn with_backoff(mut self, multiplier: f64, max_delay: Duration) -> Self {
        self.backoff_multiplier = multiplier;
        self.max_delay = max_delay;
        self
    }

    /// Description of the first pattern matching `output`
    pub fn classify(&self, output: &str) -> Option<&str> {
        self.retryable_errors
            .iter()
            .find(|(regex, _)| regex.is_match(output))
            .map(|(_, description)| description.as_str())
    }

    pub fn is_retryable(&self, output: &str) -> bool {
        self.classify(output).is_some()
    }

    /// Delay before retry number `retry` (zero-based), capped at `max_delay`
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let factor = self.backoff_multiplier.max(1.0).powi(exponent);
        let secs = (self.time_between_retries.as_secs_f64() * factor)
            .min(self.max_delay.as_secs_f64());
        Duration::try_from_secs_f64(secs).unwrap_or(self.max_delay)
    }

    pub fn patterns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.retryable_errors
            .iter()
            .map(|(regex, description)| (regex.as_str(), description.as_str()))
    }
}
