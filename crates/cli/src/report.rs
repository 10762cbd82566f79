// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reporter / Stats Writer: the human-readable summary, per-failing-Project
//! output blocks, and the §6 JSON statistics artifact (§4.8).

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use qaorc_core::{ProjectOutcome, ProjectResult, RunReport, StepResult};

use crate::error::ReportError;

/// One `suites` entry of the stats artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SuiteEntry {
    runtime: u64,
    result: String,
    failed_step: Option<String>,
    coverage: Option<HashMap<String, f64>>,
}

/// The full §6 stats artifact shape. `deny_unknown_fields` makes this
/// struct double as its own schema validator on deserialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StatsArtifact {
    total_suites: u64,
    total_seconds: u64,
    pass: u64,
    fail: u64,
    timeout: u64,
    percent_suites_configured: f64,
    suites: HashMap<String, SuiteEntry>,
}

fn build_artifact(report: &RunReport) -> StatsArtifact {
    let suites = report
        .outcomes
        .iter()
        .map(|outcome| (outcome.manifest_path.clone(), suite_entry(outcome)))
        .collect();

    StatsArtifact {
        total_suites: report.total() as u64,
        total_seconds: report.wall_clock.as_secs(),
        pass: report.pass_count() as u64,
        fail: report.fail_count() as u64,
        timeout: report.timeout_count() as u64,
        percent_suites_configured: report.percent_suites_configured(),
        suites,
    }
}

fn suite_entry(outcome: &ProjectOutcome) -> SuiteEntry {
    SuiteEntry {
        runtime: outcome.duration.as_secs(),
        result: outcome.result.as_artifact_str().to_string(),
        failed_step: outcome.result.failed_step().map(|s| s.as_str().to_string()),
        coverage: outcome.coverage.clone(),
    }
}

/// Serialize the stats artifact, round-tripping it through the
/// `deny_unknown_fields` schema to catch drift before anything touches
/// disk, then write it to `path`.
pub fn write_stats_file(report: &RunReport, path: &Path) -> Result<(), ReportError> {
    let artifact = build_artifact(report);
    let value = serde_json::to_value(&artifact)?;
    let _validated: StatsArtifact = serde_json::from_value(value.clone())?;
    let body = serde_json::to_string_pretty(&value)?;
    std::fs::write(path, body).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// The one-line run summary: `PASS: N FAIL: N TIMEOUT: N TOTAL: N in <elapsed>`.
pub fn summary_line(report: &RunReport) -> String {
    format!(
        "PASS: {} FAIL: {} TIMEOUT: {} TOTAL: {} in {}",
        report.pass_count(),
        report.fail_count(),
        report.timeout_count(),
        report.total(),
        qaorc_core::format_elapsed(report.wall_clock.as_secs()),
    )
}

/// One merged-output block per failing/timed-out step per Project, in
/// discovery order, printed after the summary per §7.
pub fn failure_blocks(report: &RunReport) -> String {
    let mut buf = String::new();
    for outcome in &report.outcomes {
        if !outcome.is_fail() && !outcome.is_timeout() {
            continue;
        }
        for step in &outcome.steps {
            if !matches!(step.result, StepResult::Fail | StepResult::Timeout) {
                continue;
            }
            buf.push_str(&format!(
                "{} (failed '{}' step):\n{}\n",
                outcome.manifest_path,
                step.step,
                step.output.trim_end()
            ));
        }
        if let ProjectResult::SetupFailure(message) = &outcome.result {
            buf.push_str(&format!("{} (failed 'setup' step):\n{}\n", outcome.manifest_path, message));
        }
    }
    buf
}

/// `--print-cov`: per-project coverage percentages, for projects that ran
/// `analyze_coverage`.
pub fn coverage_report(report: &RunReport) -> String {
    let mut buf = String::new();
    for outcome in &report.outcomes {
        let Some(coverage) = &outcome.coverage else {
            continue;
        };
        buf.push_str(&format!("{}:\n", outcome.manifest_path));
        let mut keys: Vec<&String> = coverage.keys().collect();
        keys.sort();
        for key in keys {
            buf.push_str(&format!("  {key}: {}\n", coverage[key]));
        }
    }
    buf
}

/// `--print-non-configured`: candidate manifests that did not yield a
/// Project at all.
pub fn non_configured_report(report: &RunReport) -> String {
    report.non_configured.join("\n")
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
