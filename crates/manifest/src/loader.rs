// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ties the declarative and programmatic parsers, manifest-form precedence,
//! and root-defaults merging together into [`Project`] construction.

use std::path::{Path, PathBuf};

use qaorc_core::project::EnableFlags;
use qaorc_core::Project;

use crate::declarative;
use crate::error::ManifestError;
use crate::fields::RawFields;
use crate::programmatic;

/// The `[section]`/`TEST_PARAMS` identifier this tool recognizes.
pub const SECTION_NAME: &str = "ptr";

/// Declarative manifest filename, also used for root-level defaults files.
pub const DECLARATIVE_FILENAME: &str = ".torc";

/// Programmatic manifest filename.
pub const PROGRAMMATIC_FILENAME: &str = "setup.py";

/// Load the Project for one directory, applying declarative-over-programmatic
/// precedence and root-defaults overlay. Returns `Ok(None)` when neither
/// form yields a recognized key set (the directory is not a Project).
pub fn load_project(dir: &Path) -> Result<Option<Project>, ManifestError> {
    let declarative_path = dir.join(DECLARATIVE_FILENAME);
    let programmatic_path = dir.join(PROGRAMMATIC_FILENAME);

    let declarative_fields = load_declarative_fields(&declarative_path)?;
    let winning = match declarative_fields {
        Some(fields) if fields.has_any_key() => Some((fields, declarative_path.clone())),
        _ => {
            let programmatic_fields = load_programmatic_fields(&programmatic_path)?;
            programmatic_fields
                .filter(RawFields::has_any_key)
                .map(|fields| (fields, programmatic_path.clone()))
        }
    };

    let Some((fields, manifest_path)) = winning else {
        return Ok(None);
    };

    let defaults = load_defaults(dir)?;
    let merged = match defaults {
        Some(defaults) => fields.overlay_on(&defaults),
        None => fields,
    };

    Ok(build_project(manifest_path, merged))
}

fn load_declarative_fields(path: &Path) -> Result<Option<RawFields>, ManifestError> {
    if !path.is_file() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let sections = declarative::parse_sections(path, &content)?;
    match sections.get(SECTION_NAME) {
        Some(section) => Ok(Some(RawFields::from_section(path, section)?)),
        None => Ok(None),
    }
}

fn load_programmatic_fields(path: &Path) -> Result<Option<RawFields>, ManifestError> {
    if !path.is_file() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let dict = programmatic::find_params_dict(path, &content)?;
    Ok(dict.map(|d| RawFields::from_literal_dict(&d)))
}

fn load_defaults(project_dir: &Path) -> Result<Option<RawFields>, ManifestError> {
    let Some(defaults_path) = declarative::find_defaults_file(project_dir) else {
        return Ok(None);
    };
    load_declarative_fields(&defaults_path)
}

fn build_project(manifest_path: PathBuf, fields: RawFields) -> Option<Project> {
    let flags = EnableFlags {
        run_black: fields.run_black.unwrap_or(false),
        run_mypy: fields.run_mypy.unwrap_or(false),
        run_flake8: fields.run_flake8.unwrap_or(false),
        run_pylint: fields.run_pylint.unwrap_or(false),
        run_pyre: fields.run_pyre.unwrap_or(false),
        run_pip_update: false,
        run_usort: fields.run_usort.unwrap_or(false),
    };
    Project::new(
        manifest_path,
        fields.entry_point_module.unwrap_or_default(),
        fields.test_suite.unwrap_or_default(),
        fields.test_suite_timeout.unwrap_or(0),
        fields.effective_required_coverage(),
        flags,
        fields.disabled.unwrap_or(false),
        fields.venv_pkgs.unwrap_or_default(),
    )
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
