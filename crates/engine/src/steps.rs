// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step Engine: builds the argv for one step, runs it with timeout, and
//! classifies the outcome (§4.4).

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tokio::sync::watch;

use qaorc_core::project::{EnableFlags, Environment};
use qaorc_core::{Project, StepName, StepOutcome, StepResult};

use crate::error::StepError;

/// Default timeout for every step except `tests_run`, which inherits the
/// project's `test_suite_timeout`.
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(60);

/// Extra per-project settings the Step Engine needs beyond the Project
/// record itself.
pub struct StepContext<'a> {
    pub project: &'a Project,
    pub environment: &'a Environment,
    pub coverage_data_file: PathBuf,
    pub error_on_warnings: bool,
    pub extra_tool_args: &'a [String],
    /// The run's global cancellation signal; `None` when the caller does
    /// not support cancellation (e.g. a bare Step Engine unit test).
    pub cancel: Option<watch::Receiver<bool>>,
}

/// Whether `step`'s run-guard (§4.4) permits it to run for this project.
/// `analyze_coverage`'s conditional requiredness lives with the Pipeline
/// Runner, not here; this only decides whether it runs at all.
pub fn run_guard(step: StepName, flags: &EnableFlags, requires_coverage: bool) -> bool {
    match step {
        StepName::PipInstall | StepName::TestsRun => true,
        StepName::AnalyzeCoverage => requires_coverage,
        StepName::MypyRun => flags.run_mypy,
        StepName::BlackRun => flags.run_black,
        StepName::UsortRun => flags.run_usort,
        StepName::Flake8Run => flags.run_flake8,
        StepName::PylintRun => flags.run_pylint,
        StepName::PyreRun => flags.run_pyre,
    }
}

/// Resolve the timeout for one step.
pub fn timeout_for(step: StepName, project: &Project) -> Duration {
    match step {
        StepName::TestsRun => Duration::from_secs(project.test_suite_timeout.max(1)),
        _ => DEFAULT_STEP_TIMEOUT,
    }
}

/// Build the argv for a (non-coverage-analysis) step. `analyze_coverage`
/// has no subprocess argv of its own here — it is handled by
/// [`crate::coverage`].
pub fn argv_for(step: StepName, ctx: &StepContext<'_>) -> Vec<String> {
    let interpreter = ctx.environment.interpreter.display().to_string();
    let entry = &ctx.project.entry_point_module;
    let mut argv = match step {
        StepName::PipInstall => vec![
            ctx.environment.installer.display().to_string(),
            "install".to_string(),
            "-e".to_string(),
            ".".to_string(),
        ],
        StepName::TestsRun => vec![
            interpreter,
            "-m".to_string(),
            "coverage".to_string(),
            "run".to_string(),
            "-m".to_string(),
            ctx.project.test_suite.clone(),
        ],
        StepName::AnalyzeCoverage => vec![
            interpreter,
            "-m".to_string(),
            "coverage".to_string(),
            "report".to_string(),
            "-m".to_string(),
        ],
        StepName::MypyRun => vec![interpreter, "-m".to_string(), "mypy".to_string(), entry.clone()],
        StepName::BlackRun => vec![
            interpreter,
            "-m".to_string(),
            "black".to_string(),
            "--check".to_string(),
            entry.clone(),
        ],
        StepName::UsortRun => vec![
            interpreter,
            "-m".to_string(),
            "usort".to_string(),
            "check".to_string(),
            entry.clone(),
        ],
        StepName::Flake8Run => vec![interpreter, "-m".to_string(), "flake8".to_string(), entry.clone()],
        StepName::PylintRun => vec![interpreter, "-m".to_string(), "pylint".to_string(), entry.clone()],
        StepName::PyreRun => vec![interpreter, "-m".to_string(), "pyre".to_string(), "check".to_string()],
    };
    if step == StepName::TestsRun && ctx.error_on_warnings {
        argv.push("-W".to_string());
        argv.push("error".to_string());
    }
    argv.extend(ctx.extra_tool_args.iter().cloned());
    argv
}

/// Run one step to completion and classify the result. Does not consult
/// `run_guard` — callers (the Pipeline Runner) decide whether to call this
/// at all, so that a skipped step can be recorded uniformly.
pub async fn run_step(step: StepName, ctx: &StepContext<'_>) -> Result<StepOutcome, StepError> {
    let argv = argv_for(step, ctx);
    let program = &argv[0];
    let mut cmd = tokio::process::Command::new(program);
    cmd.args(&argv[1..]);
    cmd.current_dir(&ctx.project.working_dir);

    let coverage_file = ctx.coverage_data_file.display().to_string();
    for (key, value) in
        qaorc_adapters::env::build_step_env(Some(&coverage_file), &[])
    {
        cmd.env(key, value);
    }

    let timeout = timeout_for(step, ctx.project);
    let start = Instant::now();
    let outcome = qaorc_adapters::run_with_timeout(
        cmd,
        timeout,
        qaorc_adapters::DEFAULT_GRACE_PERIOD,
        step.as_str(),
        ctx.cancel.clone(),
    )
    .await?;
    let duration = start.elapsed();

    // A cancelled step is recorded as skipped: it never reached a verdict,
    // distinct from a guard-skip (which never calls run_step at all).
    let result = if outcome.cancelled {
        StepResult::Skipped
    } else if outcome.timed_out {
        StepResult::Timeout
    } else if outcome.exit_status == Some(0) {
        StepResult::Pass
    } else {
        StepResult::Fail
    };

    Ok(StepOutcome {
        step,
        exit_status: outcome.exit_status,
        duration,
        output: outcome.output,
        result,
    })
}

#[cfg(test)]
#[path = "steps_tests.rs"]
mod tests;
