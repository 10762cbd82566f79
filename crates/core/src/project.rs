// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project and Environment data model.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The special `required_coverage` key denoting the aggregate percentage.
pub const TOTAL_COVERAGE_KEY: &str = "TOTAL";

/// Boolean enable-flags read from a manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnableFlags {
    pub run_black: bool,
    pub run_mypy: bool,
    pub run_flake8: bool,
    pub run_pylint: bool,
    pub run_pyre: bool,
    pub run_pip_update: bool,
    pub run_usort: bool,
}

/// One unit of testing, identified by the absolute path to its manifest file.
///
/// Created by the Manifest Loader at discovery time; immutable thereafter.
#[derive(Debug, Clone)]
pub struct Project {
    pub manifest_path: PathBuf,
    pub working_dir: PathBuf,
    pub entry_point_module: String,
    pub test_suite: String,
    pub test_suite_timeout: u64,
    /// Filename (relative to `working_dir`) or `TOTAL` -> minimum percent.
    pub required_coverage: HashMap<String, f64>,
    pub flags: EnableFlags,
    pub disabled: bool,
    pub venv_pkgs: Vec<String>,
}

impl Project {
    /// Construct a Project, deriving `working_dir` from `manifest_path`'s parent.
    ///
    /// Returns `None` if the manifest path has no parent (e.g. is `/`).
    pub fn new(
        manifest_path: PathBuf,
        entry_point_module: String,
        test_suite: String,
        test_suite_timeout: u64,
        required_coverage: HashMap<String, f64>,
        flags: EnableFlags,
        disabled: bool,
        venv_pkgs: Vec<String>,
    ) -> Option<Self> {
        let working_dir = manifest_path.parent()?.to_path_buf();
        Some(Self {
            manifest_path,
            working_dir,
            entry_point_module,
            test_suite,
            test_suite_timeout,
            required_coverage,
            flags,
            disabled,
            venv_pkgs,
        })
    }

    /// Whether this project requires the Coverage Analyzer step to run.
    pub fn requires_coverage(&self) -> bool {
        !self.required_coverage.is_empty()
    }

    /// The manifest path as a display-friendly string, used in reports.
    pub fn display_path(&self) -> String {
        self.manifest_path.display().to_string()
    }
}

/// How an Environment came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentOwnership {
    /// Created fresh at a temporary root for this run.
    Created,
    /// Pointed at an existing environment via `--venv`.
    Adopted,
}

/// One isolated interpreter root, shared read-only by all Pipeline Runners
/// after provisioning completes.
#[derive(Debug, Clone)]
pub struct Environment {
    pub root: PathBuf,
    pub interpreter: PathBuf,
    pub installer: PathBuf,
    pub ownership: EnvironmentOwnership,
    pub mirror_url: Option<String>,
    pub system_site_packages: bool,
}

impl Environment {
    pub fn is_owned(&self) -> bool {
        self.ownership == EnvironmentOwnership::Created
    }

    /// The coverage-data-file path scoped to one project's working directory.
    pub fn coverage_data_file(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(".qaorc-coverage")
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
