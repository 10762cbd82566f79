// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coverage Analyzer: runs the coverage tool, parses its per-file report,
//! and compares reported percentages against `required_coverage` (§4.6).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use qaorc_core::project::TOTAL_COVERAGE_KEY;
use qaorc_core::{StepName, StepOutcome, StepResult};

use crate::error::StepError;
use crate::steps::{run_step, StepContext};

/// One file's row from `coverage report -m`.
#[derive(Debug, Clone, PartialEq)]
pub struct FileCoverage {
    pub path: String,
    pub percent: f64,
    pub missing: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageReport {
    pub files: Vec<FileCoverage>,
    pub total_percent: Option<f64>,
}

/// Parse the text table emitted by `coverage report -m`. Unrecognized lines
/// (the header, the dashed rules, blank lines) are skipped rather than
/// treated as errors, since the table's decoration varies across coverage
/// tool versions.
pub fn parse_report(output: &str) -> CoverageReport {
    let mut files = Vec::new();
    let mut total_percent = None;

    for line in output.lines() {
        let line = line.trim_end();
        if line.is_empty() || line.chars().all(|c| c == '-') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let Some(name) = fields.next() else { continue };
        if name == "Name" {
            continue;
        }
        let (Some(_stmts), Some(_miss), Some(cover)) = (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };
        let Ok(percent) = cover.trim_end_matches('%').parse::<f64>() else {
            continue;
        };
        let missing = fields.collect::<Vec<_>>().join(" ");

        if name == "TOTAL" {
            total_percent = Some(percent);
        } else {
            files.push(FileCoverage {
                path: name.to_string(),
                percent,
                missing,
            });
        }
    }

    CoverageReport { files, total_percent }
}

/// Resolve a report-relative path against the project's working directory
/// and collapse a leading `/private` (the Darwin tmpfs alias) so that
/// `/private/var/...` canonicalizes the same as `/var/...`.
pub fn canonicalize_report_path(path: &str, working_dir: &Path) -> PathBuf {
    let candidate = PathBuf::from(path);
    let absolute = if candidate.is_absolute() {
        candidate
    } else {
        working_dir.join(candidate)
    };
    match absolute.strip_prefix("/private") {
        Ok(rest) => Path::new("/").join(rest),
        Err(_) => absolute,
    }
}

fn find_by_suffix<'a>(
    report: &'a CoverageReport,
    working_dir: &Path,
    key: &str,
) -> Option<&'a FileCoverage> {
    report.files.iter().find(|file| {
        canonicalize_report_path(&file.path, working_dir).ends_with(key)
    })
}

/// Outcome of comparing a parsed report against `required_coverage`.
#[derive(Debug, Clone, PartialEq)]
pub enum CoverageVerdict {
    Pass,
    Fail(Vec<String>),
}

/// Compare `report` against `required`, in sorted key order so shortfall
/// messages are deterministic.
pub fn evaluate(
    report: &CoverageReport,
    required: &HashMap<String, f64>,
    working_dir: &Path,
) -> CoverageVerdict {
    let mut keys: Vec<&String> = required.keys().collect();
    keys.sort();

    let mut shortfalls = Vec::new();
    for key in keys {
        let required_pct = required[key];
        if key == TOTAL_COVERAGE_KEY {
            match report.total_percent {
                Some(actual) if actual >= required_pct => {}
                Some(actual) => shortfalls.push(format!(
                    "{key}: {actual} < {required_pct} - Missing: aggregate coverage shortfall"
                )),
                None => shortfalls.push(format!("{key}: no aggregate coverage reported")),
            }
            continue;
        }
        match find_by_suffix(report, working_dir, key) {
            Some(file) if file.percent >= required_pct => {}
            Some(file) => shortfalls.push(format!(
                "{key}: {} < {required_pct} - Missing: {}",
                file.percent, file.missing
            )),
            None => shortfalls.push(format!("{key}: no coverage data reported")),
        }
    }

    if shortfalls.is_empty() {
        CoverageVerdict::Pass
    } else {
        CoverageVerdict::Fail(shortfalls)
    }
}

/// Run the coverage tool and evaluate its report against the project's
/// `required_coverage`. A failure or timeout of the coverage tool itself is
/// returned as-is; missing per-file data is a coverage fail, never an
/// internal error (§4.6).
pub async fn run_coverage_analysis(
    ctx: &StepContext<'_>,
) -> Result<(StepOutcome, CoverageReport), StepError> {
    let outcome = run_step(StepName::AnalyzeCoverage, ctx).await?;
    if outcome.result != StepResult::Pass {
        return Ok((outcome, CoverageReport::default()));
    }

    let report = parse_report(&outcome.output);
    let verdict = evaluate(&report, &ctx.project.required_coverage, &ctx.project.working_dir);
    let outcome = match verdict {
        CoverageVerdict::Pass => outcome,
        CoverageVerdict::Fail(shortfalls) => {
            let mut output = outcome.output;
            output.push('\n');
            output.push_str(&shortfalls.join("\n"));
            StepOutcome {
                output,
                result: StepResult::Fail,
                ..outcome
            }
        }
    };
    Ok((outcome, report))
}

/// Flatten a parsed report into the `ProjectOutcome.coverage` map: per-file
/// percentages plus `TOTAL` when present.
pub fn report_to_map(report: &CoverageReport) -> HashMap<String, f64> {
    let mut map: HashMap<String, f64> =
        report.files.iter().map(|f| (f.path.clone(), f.percent)).collect();
    if let Some(total) = report.total_percent {
        map.insert(TOTAL_COVERAGE_KEY.to_string(), total);
    }
    map
}

#[cfg(test)]
#[path = "coverage_tests.rs"]
mod tests;
