// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-project and whole-run outcome aggregation.

use crate::step::{StepName, StepOutcome};
use std::time::Duration;

/// Terminal classification of one project's pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectResult {
    Pass,
    FailAtStep(StepName),
    TimeoutAtStep(StepName),
    SkippedDisabled,
    SkippedCancelled,
    SetupFailure(String),
}

impl ProjectResult {
    /// The §6 stats-artifact `result` tag: one of `pass|fail|timeout|skipped`.
    pub fn as_artifact_str(&self) -> &'static str {
        match self {
            ProjectResult::Pass => "pass",
            ProjectResult::FailAtStep(_) | ProjectResult::SetupFailure(_) => "fail",
            ProjectResult::TimeoutAtStep(_) => "timeout",
            ProjectResult::SkippedDisabled | ProjectResult::SkippedCancelled => "skipped",
        }
    }

    /// The step name that failed/timed out, if any (for `failed_step`).
    pub fn failed_step(&self) -> Option<StepName> {
        match self {
            ProjectResult::FailAtStep(step) | ProjectResult::TimeoutAtStep(step) => Some(*step),
            _ => None,
        }
    }
}

/// Full record of one project's pipeline execution.
#[derive(Debug, Clone)]
pub struct ProjectOutcome {
    pub manifest_path: String,
    pub steps: Vec<StepOutcome>,
    pub result: ProjectResult,
    pub duration: Duration,
    /// Per-file coverage percent, present only when `analyze_coverage` ran.
    pub coverage: Option<std::collections::HashMap<String, f64>>,
}

impl ProjectOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self.result, ProjectResult::Pass)
    }

    pub fn is_fail(&self) -> bool {
        matches!(
            self.result,
            ProjectResult::FailAtStep(_) | ProjectResult::SetupFailure(_)
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.result, ProjectResult::TimeoutAtStep(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(
            self.result,
            ProjectResult::SkippedDisabled | ProjectResult::SkippedCancelled
        )
    }
}

/// Aggregated result of a whole run, in discovery order.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcomes: Vec<ProjectOutcome>,
    pub wall_clock: Duration,
    /// Raw candidate count from the Discovery Walker (denominator for
    /// `percent_suites_configured`), including candidates that did not
    /// yield a Project.
    pub discovered_candidates: usize,
    /// Candidate manifest paths that did not yield a Project (no tool
    /// section/variable present), for `--print-non-configured`.
    pub non_configured: Vec<String>,
}

impl RunReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn pass_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_pass()).count()
    }

    pub fn fail_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_fail()).count()
    }

    pub fn timeout_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_timeout()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_skipped()).count()
    }

    /// `100 * total_suites / discovered_candidates`; 0 when nothing was discovered.
    pub fn percent_suites_configured(&self) -> f64 {
        if self.discovered_candidates == 0 {
            return 0.0;
        }
        100.0 * self.total() as f64 / self.discovered_candidates as f64
    }

    /// Per spec.md's exit-code contract: 0 requires `fail + timeout == 0`
    /// regardless of skipped count.
    pub fn is_success(&self) -> bool {
        self.fail_count() == 0 && self.timeout_count() == 0
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
