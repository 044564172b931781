use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use super::RetryConfig;
use crate::{
    error::{Error, Result},
    runners::{RetryPolicy, RunnerOptions},
    types::ValidationTarget,
};

/// File names looked up in each directory, in order
pub const CONFIG_FILE_NAMES: [&str; 2] = [".tfcheck.json", "tfcheck.json"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Program to run instead of `terraform`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terraform_binary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
    /// Per-command deadline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub no_color: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryConfig>,
    #[serde(default)]
    pub targets: Vec<ValidationTarget>,

    /// Directory relative target paths are resolved against (internal, not exposed in JSON)
    #[serde(skip)]
    pub root: Option<PathBuf>,
}

impl Config {
    pub fn new(targets: Vec<ValidationTarget>) -> Self {
        Self {
            targets,
            ..Default::default()
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config =
            serde_json::from_str(&contents).map_err(|source| Error::SerializationError {
                path: path.to_path_buf(),
                source,
            })?;
        config.root = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents =
            serde_json::to_string_pretty(self).map_err(|source| Error::SerializationError {
                path: path.to_path_buf(),
                source,
            })?;
        std::fs::write(path, contents + "\n")?;
        Ok(())
    }

    /// Walk up from `start_path` looking for a config file
    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path;

        loop {
            for name in CONFIG_FILE_NAMES {
                let config_path = current.join(name);
                if config_path.is_file() {
                    return Some(config_path);
                }
            }

            current = current.parent()?;
        }
    }

    /// Find and load the nearest config file above `start_path`
    pub fn load(start_path: &Path) -> Result<Self> {
        let path = Self::find_config_file(start_path).ok_or_else(|| {
            Error::ConfigError(format!(
                "No {} found in {} or any parent directory",
                CONFIG_FILE_NAMES[0],
                start_path.display()
            ))
        })?;
        debug!("Loading config from {}", path.display());
        Self::load_from_file(&path)
    }

    /// Targets with relative directories resolved against the config file location
    pub fn resolved_targets(&self) -> Vec<ValidationTarget> {
        match &self.root {
            Some(root) => self
                .targets
                .iter()
                .map(|target| target.resolve_against(root))
                .collect(),
            None => self.targets.clone(),
        }
    }

    pub fn runner_options(&self) -> RunnerOptions {
        let mut options = RunnerOptions::default().with_no_color(self.no_color);
        if let Some(ref binary) = self.terraform_binary {
            options = options.with_binary(binary);
        }
        for (key, value) in &self.env {
            options = options.with_env(key, value);
        }
        options
    }

    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        match &self.retry {
            Some(retry) => retry.to_policy(),
            None => Ok(RetryPolicy::default()),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
