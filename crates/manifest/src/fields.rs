// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The closed set of manifest keys (§6), in an intermediate typed form
//! shared by both the declarative and programmatic parsers before they are
//! folded into a [`qaorc_core::Project`].

use std::collections::HashMap;
use std::path::Path;

use crate::declarative::{self, RawSection};
use crate::error::ManifestError;
use crate::programmatic::Literal;

/// One manifest's recognized fields, each `None` when absent from the source.
#[derive(Debug, Clone, Default)]
pub struct RawFields {
    pub entry_point_module: Option<String>,
    pub test_suite: Option<String>,
    pub test_suite_timeout: Option<u64>,
    pub required_coverage: Option<HashMap<String, f64>>,
    pub required_coverage_pct: Option<HashMap<String, f64>>,
    pub run_black: Option<bool>,
    pub run_mypy: Option<bool>,
    pub run_flake8: Option<bool>,
    pub run_pylint: Option<bool>,
    pub run_pyre: Option<bool>,
    pub run_usort: Option<bool>,
    pub disabled: Option<bool>,
    pub venv_pkgs: Option<Vec<String>>,
}

impl RawFields {
    /// Whether any recognized key is present — a `[ptr]` section (or
    /// `TEST_PARAMS` dict) with none of these keys is not a Project.
    pub fn has_any_key(&self) -> bool {
        self.entry_point_module.is_some()
            || self.test_suite.is_some()
            || self.test_suite_timeout.is_some()
            || self.required_coverage.is_some()
            || self.required_coverage_pct.is_some()
            || self.run_black.is_some()
            || self.run_mypy.is_some()
            || self.run_flake8.is_some()
            || self.run_pylint.is_some()
            || self.run_pyre.is_some()
            || self.run_usort.is_some()
            || self.disabled.is_some()
            || self.venv_pkgs.is_some()
    }

    /// Build from a declarative `[ptr]` section's raw string values.
    pub fn from_section(path: &Path, section: &RawSection) -> Result<Self, ManifestError> {
        let mut fields = RawFields::default();
        for (key, raw) in section {
            match key.as_str() {
                "entry_point_module" => fields.entry_point_module = Some(raw.clone()),
                "test_suite" => fields.test_suite = Some(raw.clone()),
                "test_suite_timeout" => {
                    fields.test_suite_timeout = Some(declarative::coerce_int(path, key, raw)?)
                }
                "required_coverage" => {
                    fields.required_coverage =
                        Some(declarative::coerce_coverage_map(path, key, raw)?)
                }
                "required_coverage_pct" => {
                    fields.required_coverage_pct =
                        Some(declarative::coerce_coverage_pct_map(path, key, raw)?)
                }
                "run_black" => fields.run_black = Some(declarative::coerce_bool(path, key, raw)?),
                "run_mypy" => fields.run_mypy = Some(declarative::coerce_bool(path, key, raw)?),
                "run_flake8" => {
                    fields.run_flake8 = Some(declarative::coerce_bool(path, key, raw)?)
                }
                "run_pylint" => {
                    fields.run_pylint = Some(declarative::coerce_bool(path, key, raw)?)
                }
                "run_pyre" => fields.run_pyre = Some(declarative::coerce_bool(path, key, raw)?),
                "run_usort" => {
                    fields.run_usort = Some(declarative::coerce_bool(path, key, raw)?)
                }
                "disabled" => fields.disabled = Some(declarative::coerce_bool(path, key, raw)?),
                "venv_pkgs" => fields.venv_pkgs = Some(declarative::coerce_list(raw)),
                _ => {}
            }
        }
        Ok(fields)
    }

    /// Build from a programmatic `TEST_PARAMS` dict literal.
    pub fn from_literal_dict(dict: &HashMap<String, Literal>) -> Self {
        let mut fields = RawFields::default();
        fields.entry_point_module = dict
            .get("entry_point_module")
            .and_then(Literal::as_str)
            .map(str::to_string);
        fields.test_suite = dict.get("test_suite").and_then(Literal::as_str).map(str::to_string);
        fields.test_suite_timeout = dict.get("test_suite_timeout").and_then(Literal::as_u64);
        fields.required_coverage = dict.get("required_coverage").and_then(Literal::as_dict).map(literal_map_to_f64);
        fields.required_coverage_pct = dict
            .get("required_coverage_pct")
            .and_then(Literal::as_dict)
            .map(literal_map_to_f64);
        fields.run_black = dict.get("run_black").and_then(Literal::as_bool);
        fields.run_mypy = dict.get("run_mypy").and_then(Literal::as_bool);
        fields.run_flake8 = dict.get("run_flake8").and_then(Literal::as_bool);
        fields.run_pylint = dict.get("run_pylint").and_then(Literal::as_bool);
        fields.run_pyre = dict.get("run_pyre").and_then(Literal::as_bool);
        fields.run_usort = dict.get("run_usort").and_then(Literal::as_bool);
        fields.disabled = dict.get("disabled").and_then(Literal::as_bool);
        fields.venv_pkgs = dict.get("venv_pkgs").and_then(Literal::as_list).map(|items| {
            items
                .iter()
                .filter_map(Literal::as_str)
                .map(str::to_string)
                .collect()
        });
        fields
    }

    /// Overlay `self` (project-local) on top of `defaults`: per-field, a
    /// value present locally wins, otherwise the default is used.
    pub fn overlay_on(self, defaults: &RawFields) -> Self {
        Self {
            entry_point_module: self.entry_point_module.or_else(|| defaults.entry_point_module.clone()),
            test_suite: self.test_suite.or_else(|| defaults.test_suite.clone()),
            test_suite_timeout: self.test_suite_timeout.or(defaults.test_suite_timeout),
            required_coverage: self.required_coverage.or_else(|| defaults.required_coverage.clone()),
            required_coverage_pct: self
                .required_coverage_pct
                .or_else(|| defaults.required_coverage_pct.clone()),
            run_black: self.run_black.or(defaults.run_black),
            run_mypy: self.run_mypy.or(defaults.run_mypy),
            run_flake8: self.run_flake8.or(defaults.run_flake8),
            run_pylint: self.run_pylint.or(defaults.run_pylint),
            run_pyre: self.run_pyre.or(defaults.run_pyre),
            run_usort: self.run_usort.or(defaults.run_usort),
            disabled: self.disabled.or(defaults.disabled),
            venv_pkgs: self.venv_pkgs.or_else(|| defaults.venv_pkgs.clone()),
        }
    }

    /// The effective `required_coverage` map: `required_coverage` wins over
    /// the `required_coverage_pct` back-compat alias when both are present.
    pub fn effective_required_coverage(&self) -> HashMap<String, f64> {
        self.required_coverage
            .clone()
            .or_else(|| self.required_coverage_pct.clone())
            .unwrap_or_default()
    }
}

fn literal_map_to_f64(map: &HashMap<String, Literal>) -> HashMap<String, f64> {
    map.iter()
        .filter_map(|(k, v)| v.as_f64().map(|f| (k.clone(), f)))
        .collect()
}

#[cfg(test)]
#[path = "fields_tests.rs"]
mod tests;
