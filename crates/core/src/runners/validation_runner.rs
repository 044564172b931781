//! Runs the init → fmt -check → validate sequence for one target

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{RetryPolicy, RunState, RunnerOptions, StepEvent, StepRecord, TargetReport};
use crate::{
    command::{CommandExecutor, CommandOutput, ToolCommand},
    error::StepError,
    types::{Step, ValidationTarget},
};

type Sleeper = Box<dyn Fn(Duration) + Send + Sync>;

/// Checks targets one at a time through an injected [`CommandExecutor`]
pub struct ValidationRunner<E> {
    executor: E,
    retry_policy: RetryPolicy,
    options: RunnerOptions,
    sleeper: Sleeper,
}

impl<E: CommandExecutor> ValidationRunner<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            retry_policy: RetryPolicy::default(),
            options: RunnerOptions::default(),
            sleeper: Box::new(std::thread::sleep),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn with_options(mut self, options: RunnerOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the function used to wait between retries
    pub fn with_sleeper(mut self, sleeper: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// The command run for `step` against `target`
    pub fn command_for(&self, step: Step, target: &ValidationTarget) -> ToolCommand {
        let mut command = ToolCommand::new(&self.options.terraform_binary, step.args(target))
            .with_working_dir(&target.dir)
            .with_env("TF_IN_AUTOMATION", "1")
            .with_env("TF_INPUT", "0");

        if self.options.no_color {
            command = command.with_arg("-no-color");
        }

        for (key, value) in &self.options.env {
            command = command.with_env(key, value);
        }

        command
    }

    /// Every command a passing run of `target` would execute
    pub fn plan(&self, target: &ValidationTarget) -> Vec<ToolCommand> {
        Step::ALL
            .iter()
            .map(|step| self.command_for(*step, target))
            .collect()
    }

    /// Run all steps against `target`, stopping at the first failure
    pub fn validate(&self, target: &ValidationTarget) -> TargetReport {
        let started = Instant::now();
        info!("Checking {}", target.label());

        let mut state = RunState::Pending.advance(StepEvent::Start);
        let mut steps = Vec::new();

        while let Some(step) = state.step() {
            let event = if step == Step::Init && !target.dir.is_dir() {
                let message = if target.dir.exists() {
                    format!("Not a directory: {}", target.dir.display())
                } else {
                    format!("Directory does not exist: {}", target.dir.display())
                };
                StepEvent::Failed(StepError::new(step, None, message))
            } else {
                let record = self.run_step(step, target);
                let event = if record.succeeded() {
                    StepEvent::Completed
                } else {
                    StepEvent::Failed(StepError::new(
                        step,
                        record.output.exit_code,
                        record.output.combined(),
                    ))
                };
                steps.push(record);
                event
            };
            state = state.advance(event);
        }

        match &state {
            RunState::Failed { step, cause } => {
                warn!("{} failed at {}: {}", target.label(), step, cause);
            }
            _ => info!("{} passed", target.label()),
        }

        TargetReport {
            target: target.clone(),
            state,
            steps,
            duration: started.elapsed(),
        }
    }

    /// Like [`validate`](Self::validate) but only keeps the failure, if any
    pub fn validate_result(&self, target: &ValidationTarget) -> Result<(), StepError> {
        self.validate(target).into_result()
    }

    fn run_step(&self, step: Step, target: &ValidationTarget) -> StepRecord {
        let command = self.command_for(step, target);
        let started = Instant::now();
        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!("Running: {} (attempt {})", command.to_shell_command(), attempts);

            let output = self.executor.execute(&command).unwrap_or_else(|e| {
                warn!("Could not run `{}`: {}", command.to_shell_command(), e);
                CommandOutput::from_error(&e)
            });

            let retry = !output.success()
                && step.is_retryable()
                && attempts <= self.retry_policy.max_retries;
            let reason = if retry {
                self.retry_policy.classify(&output.combined())
            } else {
                None
            };

            let Some(reason) = reason else {
                return StepRecord {
                    step,
                    attempts,
                    duration: started.elapsed(),
                    output,
                };
            };

            let delay = self.retry_policy.delay_for(attempts - 1);
            warn!(
                "{} hit a retryable error during {} ({}); retrying in {:?}",
                target.label(),
                step,
                reason,
                delay
            );
            (self.sleeper)(delay);
        }
    }
}
