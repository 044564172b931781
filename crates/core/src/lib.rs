//! tfcheck-core - Engine for checking Terraform module directories
//!
//! This crate provides functionality to:
//! - Describe validation targets (a directory plus its backend setting)
//! - Run `init`, `fmt -check` and `validate` against a target, stopping at the first failure
//! - Retry transient `init` failures according to a pluggable policy
//! - Check many targets in parallel without touching the same directory twice at once
pub mod command;
pub mod config;
pub mod error;
pub mod runners;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{Error, Result, StepError};
pub use types::*;

// Re-export main API components
pub use command::{CommandExecutor, CommandOutput, ProcessExecutor, ToolCommand};
pub use config::Config;
pub use runners::{
    RetryPolicy, RunState, RunnerOptions, StepEvent, StepRecord, SuiteReport, SuiteRunner,
    TargetReport, ValidationRunner,
};
