// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The fixed step set and per-step outcome record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// One of the fixed, ordered QA actions the Step Engine can run for a project.
///
/// Order here is the pipeline order; `usort_run` is a back-compat addition to
/// the original step set, run directly after `black_run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepName {
    PipInstall,
    TestsRun,
    AnalyzeCoverage,
    MypyRun,
    BlackRun,
    UsortRun,
    Flake8Run,
    PylintRun,
    PyreRun,
}

impl StepName {
    /// The full pipeline in normative order (§4.4, with `usort_run` inserted
    /// after `black_run`).
    pub const PIPELINE_ORDER: [StepName; 9] = [
        StepName::PipInstall,
        StepName::TestsRun,
        StepName::AnalyzeCoverage,
        StepName::MypyRun,
        StepName::BlackRun,
        StepName::UsortRun,
        StepName::Flake8Run,
        StepName::PylintRun,
        StepName::PyreRun,
    ];

    /// Whether this step's failure halts the pipeline for its project.
    ///
    /// `analyze_coverage` is required only when the project declares
    /// `required_coverage` entries; that conditional part of the contract
    /// lives with the caller (the Pipeline Runner), not here.
    pub fn is_required(self) -> bool {
        matches!(self, StepName::PipInstall | StepName::TestsRun)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StepName::PipInstall => "pip_install",
            StepName::TestsRun => "tests_run",
            StepName::AnalyzeCoverage => "analyze_coverage",
            StepName::MypyRun => "mypy_run",
            StepName::BlackRun => "black_run",
            StepName::UsortRun => "usort_run",
            StepName::Flake8Run => "flake8_run",
            StepName::PylintRun => "pylint_run",
            StepName::PyreRun => "pyre_run",
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification of a finished (or skipped) step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepResult {
    Pass,
    Fail,
    Timeout,
    Skipped,
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepResult::Pass => write!(f, "pass"),
            StepResult::Fail => write!(f, "fail"),
            StepResult::Timeout => write!(f, "timeout"),
            StepResult::Skipped => write!(f, "skipped"),
        }
    }
}

/// Record of one step's execution for one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step: StepName,
    pub exit_status: Option<i32>,
    pub duration: Duration,
    /// Merged, bounded-length stdout+stderr capture.
    pub output: String,
    pub result: StepResult,
}

impl StepOutcome {
    pub fn skipped(step: StepName) -> Self {
        Self {
            step,
            exit_status: None,
            duration: Duration::ZERO,
            output: String::new(),
            result: StepResult::Skipped,
        }
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
