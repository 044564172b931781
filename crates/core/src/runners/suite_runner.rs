//! Parallel checking of many targets
//!
//! Targets sharing a directory are grouped and handed to a single worker, so
//! the tool never runs twice at once against the same `.terraform` state.
//! Distinct directories share nothing and run side by side.

use rayon::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

use super::{SuiteReport, TargetReport, ValidationRunner};
use crate::{command::CommandExecutor, types::ValidationTarget};

pub struct SuiteRunner<E> {
    runner: ValidationRunner<E>,
    jobs: usize,
}

impl<E: CommandExecutor> SuiteRunner<E> {
    pub fn new(runner: ValidationRunner<E>) -> Self {
        Self { runner, jobs: 1 }
    }

    /// Maximum number of targets checked at the same time (at least one)
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    pub fn runner(&self) -> &ValidationRunner<E> {
        &self.runner
    }

    /// Check every target and return reports in the order given
    pub fn run(&self, targets: &[ValidationTarget]) -> SuiteReport {
        let groups = group_by_directory(targets);
        let workers = self.jobs.min(groups.len()).max(1);
        debug!(
            "Checking {} target(s) in {} directory group(s) with {} worker(s)",
            targets.len(),
            groups.len(),
            workers
        );

        // Each group stays on one worker, so a directory is never shared
        let runner = &self.runner;
        let check_groups = move || -> Vec<(usize, TargetReport)> {
            groups
                .into_par_iter()
                .flat_map_iter(move |group| {
                    group
                        .into_iter()
                        .map(move |index| (index, runner.validate(&targets[index])))
                })
                .collect()
        };

        let mut reports = match rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("tfcheck-worker-{i}"))
            .build()
        {
            Ok(pool) => pool.install(check_groups),
            Err(e) => {
                warn!("Could not start a {workers}-thread pool ({e}); using the global pool");
                check_groups()
            }
        };
        reports.sort_by_key(|(index, _)| *index);

        SuiteReport {
            reports: reports.into_iter().map(|(_, report)| report).collect(),
        }
    }
}

/// Target indices grouped by directory, groups in order of first appearance
fn group_by_directory(targets: &[ValidationTarget]) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut by_key: HashMap<PathBuf, usize> = HashMap::new();

    for (index, target) in targets.iter().enumerate() {
        let slot = *by_key.entry(target.directory_key()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(index);
    }

    groups
}
