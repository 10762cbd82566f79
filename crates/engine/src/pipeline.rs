// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline Runner: sequences the Step Engine over one Project's fixed step
//! set, short-circuiting only on a required step's failure (§4.5).

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::sync::watch;

use qaorc_core::project::{EnableFlags, Environment};
use qaorc_core::{Project, ProjectOutcome, ProjectResult, StepName, StepOutcome, StepResult};

use crate::coverage::{report_to_map, run_coverage_analysis};
use crate::error::StepError;
use crate::steps::{run_guard, run_step, StepContext};

/// Per-run settings a Pipeline Runner needs beyond one Project's own fields.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub error_on_warnings: bool,
    pub extra_tool_args: Vec<String>,
    /// `--run-disabled`: run a `disabled` project anyway.
    pub run_disabled: bool,
}

/// Run every applicable step for `project` against `environment`, in
/// [`StepName::PIPELINE_ORDER`], and fold the outcomes into a terminal
/// [`ProjectOutcome`]. `cancel` is the run's global cancellation signal;
/// a step that is torn down mid-flight because of it yields a
/// `SkippedCancelled` outcome rather than a fail or timeout.
pub async fn run_pipeline(
    project: &Project,
    environment: &Environment,
    options: &PipelineOptions,
    cancel: watch::Receiver<bool>,
) -> Result<ProjectOutcome, StepError> {
    let run_start = std::time::Instant::now();

    if project.disabled && !options.run_disabled {
        tracing::info!(project = %project.display_path(), "skipping disabled project");
        return Ok(ProjectOutcome {
            manifest_path: project.display_path(),
            result: ProjectResult::SkippedDisabled,
            steps: Vec::new(),
            duration: run_start.elapsed(),
            coverage: None,
        });
    }

    let coverage_data_file = coverage_data_file_for(project, environment);
    let ctx = StepContext {
        project,
        environment,
        coverage_data_file,
        error_on_warnings: options.error_on_warnings,
        extra_tool_args: &options.extra_tool_args,
        cancel: Some(cancel),
    };

    let span = tracing::info_span!("pipeline", project = %project.display_path());
    let _guard = span.enter();

    let mut steps = Vec::new();
    let mut coverage: Option<HashMap<String, f64>> = None;
    let requires_coverage = project.requires_coverage();

    for step in StepName::PIPELINE_ORDER {
        if !run_guard(step, &project.flags, requires_coverage) {
            continue;
        }

        let start = std::time::Instant::now();
        let outcome = if step == StepName::AnalyzeCoverage {
            let (outcome, report) = run_coverage_analysis(&ctx).await?;
            coverage = Some(report_to_map(&report));
            outcome
        } else {
            run_step(step, &ctx).await?
        };
        let elapsed = start.elapsed();

        if outcome.result == StepResult::Skipped {
            tracing::warn!(step = %step, "step cancelled mid-flight");
            steps.push(outcome);
            return Ok(ProjectOutcome {
                manifest_path: project.display_path(),
                result: ProjectResult::SkippedCancelled,
                steps,
                duration: run_start.elapsed(),
                coverage,
            });
        }

        if outcome.result == StepResult::Pass {
            tracing::info!(step = %step, elapsed_ms = elapsed.as_millis() as u64, "step passed");
        } else {
            tracing::warn!(step = %step, elapsed_ms = elapsed.as_millis() as u64, result = %outcome.result, "step did not pass");
        }

        let failed = matches!(outcome.result, StepResult::Fail | StepResult::Timeout);
        let is_required =
            step.is_required() || (step == StepName::AnalyzeCoverage && requires_coverage);
        steps.push(outcome);

        if failed && is_required {
            break;
        }
    }

    let result = terminal_result(&steps);
    Ok(ProjectOutcome {
        manifest_path: project.display_path(),
        result,
        steps,
        duration: run_start.elapsed(),
        coverage,
    })
}

fn coverage_data_file_for(project: &Project, environment: &Environment) -> PathBuf {
    environment.coverage_data_file(&project.working_dir)
}

/// Terminal classification is the step of the first-encountered failure or
/// timeout, in pipeline order; pass if every recorded step passed.
fn terminal_result(steps: &[StepOutcome]) -> ProjectResult {
    for outcome in steps {
        match outcome.result {
            StepResult::Fail => return ProjectResult::FailAtStep(outcome.step),
            StepResult::Timeout => return ProjectResult::TimeoutAtStep(outcome.step),
            StepResult::Pass | StepResult::Skipped => {}
        }
    }
    ProjectResult::Pass
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
