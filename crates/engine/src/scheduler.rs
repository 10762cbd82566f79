// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler: runs at most N Pipeline Runners concurrently over a list of
//! Projects, honors a global cancellation signal, and emits optional
//! progress heartbeats (§4.7).

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinSet;

use qaorc_core::project::Environment;
use qaorc_core::{Project, ProjectOutcome, ProjectResult};

use crate::pipeline::{run_pipeline, PipelineOptions};

/// Receiving end of the global cancellation signal; `true` once cancellation
/// has been requested. Scheduler callers hold the paired `watch::Sender`.
pub type CancelSignal = watch::Receiver<bool>;

#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    pub concurrency: usize,
    pub heartbeat_interval: Option<Duration>,
    pub pipeline: PipelineOptions,
}

/// A heartbeat snapshot (§4.7): counts of queued/running/completed projects
/// and the names of projects currently in flight.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStatus {
    pub queued: usize,
    pub running: Vec<String>,
    pub completed_pass: usize,
    pub completed_fail: usize,
    pub completed_timeout: usize,
    pub completed_skipped: usize,
}

/// Run every Project's Pipeline Runner, at most `options.concurrency` at a
/// time, and return their outcomes in discovery order regardless of
/// completion order.
pub async fn run_scheduler(
    projects: Vec<Project>,
    environment: Arc<Environment>,
    options: SchedulerOptions,
    mut cancel: CancelSignal,
) -> Vec<ProjectOutcome> {
    let total = projects.len();
    let cap = options.concurrency.max(1);
    let pipeline_options = Arc::new(options.pipeline);

    let mut outcomes: Vec<Option<ProjectOutcome>> = (0..total).map(|_| None).collect();
    let mut pending: VecDeque<(usize, Project)> = projects.into_iter().enumerate().collect();
    let running: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));
    let mut join_set: JoinSet<(usize, String, Result<ProjectOutcome, crate::error::StepError>)> =
        JoinSet::new();

    let mut heartbeat = options.heartbeat_interval.map(tokio::time::interval);
    let mut counts = SchedulerStatus::default();

    loop {
        // Refill up to the concurrency cap, unless cancellation already landed.
        while join_set.len() < cap && !*cancel.borrow() {
            let Some((idx, project)) = pending.pop_front() else {
                break;
            };
            running.lock().unwrap_or_else(|e| e.into_inner()).insert(project.display_path());
            let env = Arc::clone(&environment);
            let opts = Arc::clone(&pipeline_options);
            let running = Arc::clone(&running);
            let path = project.display_path();
            let path_for_return = path.clone();
            let cancel_rx = cancel.clone();
            join_set.spawn(async move {
                let result = run_pipeline(&project, &env, &opts, cancel_rx).await;
                running.lock().unwrap_or_else(|e| e.into_inner()).remove(&path);
                (idx, path_for_return, result)
            });
        }

        if *cancel.borrow() {
            for (idx, project) in pending.drain(..) {
                outcomes[idx] = Some(skipped_cancelled(&project));
                counts.completed_skipped += 1;
            }
        }

        if join_set.is_empty() {
            break;
        }

        tokio::select! {
            joined = join_set.join_next() => {
                match joined {
                    Some(Ok((idx, _path, Ok(outcome)))) => {
                        tally(&mut counts, &outcome.result);
                        outcomes[idx] = Some(outcome);
                    }
                    Some(Ok((idx, path, Err(err)))) => {
                        tracing::error!(error = %err, "pipeline runner failed internally");
                        let outcome = ProjectOutcome {
                            manifest_path: path,
                            result: ProjectResult::SetupFailure(err.to_string()),
                            steps: Vec::new(),
                            duration: Duration::ZERO,
                            coverage: None,
                        };
                        counts.completed_fail += 1;
                        outcomes[idx] = Some(outcome);
                    }
                    Some(Err(join_err)) => {
                        tracing::error!(error = %join_err, "pipeline runner task panicked");
                    }
                    None => {}
                }
            }
            _ = tick(&mut heartbeat) => {
                let status = SchedulerStatus {
                    queued: pending.len(),
                    running: sorted_running(&running),
                    ..counts.clone()
                };
                emit_heartbeat(&status);
            }
            _ = cancel.changed() => {}
        }
    }

    // Every index is filled by the time the loop above exits: the refill
    // loop only stops early on cancellation, and cancellation immediately
    // drains the remaining pending projects into a skipped outcome.
    outcomes.into_iter().flatten().collect()
}

fn tally(counts: &mut SchedulerStatus, result: &ProjectResult) {
    match result {
        ProjectResult::Pass => counts.completed_pass += 1,
        ProjectResult::FailAtStep(_) | ProjectResult::SetupFailure(_) => counts.completed_fail += 1,
        ProjectResult::TimeoutAtStep(_) => counts.completed_timeout += 1,
        ProjectResult::SkippedDisabled | ProjectResult::SkippedCancelled => {
            counts.completed_skipped += 1
        }
    }
}

fn skipped_cancelled(project: &Project) -> ProjectOutcome {
    ProjectOutcome {
        manifest_path: project.display_path(),
        result: ProjectResult::SkippedCancelled,
        steps: Vec::new(),
        duration: Duration::ZERO,
        coverage: None,
    }
}

fn sorted_running(running: &Mutex<HashSet<String>>) -> Vec<String> {
    let mut names: Vec<String> = running
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .iter()
        .cloned()
        .collect();
    names.sort();
    names
}

async fn tick(heartbeat: &mut Option<tokio::time::Interval>) {
    match heartbeat {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn emit_heartbeat(status: &SchedulerStatus) {
    tracing::info!(
        queued = status.queued,
        running = ?status.running,
        pass = status.completed_pass,
        fail = status.completed_fail,
        timeout = status.completed_timeout,
        skipped = status.completed_skipped,
        "heartbeat"
    );
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
