use anyhow::{Context, Result, bail};
use std::num::NonZeroUsize;
use std::time::Duration;
use tfcheck_core::{
    Config, ProcessExecutor, SuiteRunner, ValidationRunner, ValidationTarget,
};
use tracing::info;

use super::load_config;
use crate::cli::RunArgs;
use crate::display::{format_dry_run, format_suite_report};

pub fn run_command(args: &RunArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let targets = select_targets(&config, &args.targets)?;

    let mut options = config.runner_options();
    if args.no_color {
        options.no_color = true;
    }
    let policy = config
        .retry_policy()
        .context("Invalid retry configuration")?;
    let timeout = args.timeout.map(Duration::from_secs).or(config.timeout());

    let runner = ValidationRunner::new(ProcessExecutor::new().with_timeout(timeout))
        .with_retry_policy(policy)
        .with_options(options);

    if args.dry_run {
        for target in &targets {
            print!("{}", format_dry_run(target, &runner.plan(target)));
        }
        return Ok(());
    }

    let jobs = args.jobs.or(config.jobs).unwrap_or_else(default_jobs);
    info!("Checking {} target(s) with {} job(s)", targets.len(), jobs);

    let suite = SuiteRunner::new(runner).with_jobs(jobs);
    let report = suite.run(&targets);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_suite_report(&report));
    }

    if !report.is_success() {
        std::process::exit(1);
    }

    Ok(())
}

/// Resolved targets, narrowed to `filters` when any are given
fn select_targets(config: &Config, filters: &[String]) -> Result<Vec<ValidationTarget>> {
    if filters.is_empty() {
        return Ok(config.resolved_targets());
    }

    for filter in filters {
        if !config.targets.iter().any(|t| t.matches(filter)) {
            bail!("No configured target matches '{}'", filter);
        }
    }

    let selected = config
        .targets
        .iter()
        .zip(config.resolved_targets())
        .filter(|(raw, _)| filters.iter().any(|f| raw.matches(f)))
        .map(|(_, resolved)| resolved)
        .collect();

    Ok(selected)
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
