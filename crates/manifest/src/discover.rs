// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recursive, deterministic discovery of candidate manifest directories.

use std::path::{Path, PathBuf};

use qaorc_core::Project;

use crate::loader::{self, DECLARATIVE_FILENAME, PROGRAMMATIC_FILENAME};

/// Output of one discovery walk.
pub struct DiscoveryResult {
    pub projects: Vec<Project>,
    /// Raw count of candidate manifest files found, the denominator for
    /// `percent_suites_configured` (§8).
    pub discovered_candidates: usize,
    /// Candidate manifest paths that did not yield a Project.
    pub non_configured: Vec<String>,
}

/// Walk `base_dir` recursively, deterministically (sorted directory
/// entries), skipping dot-prefixed directories, and load a Project for
/// every directory containing a recognized manifest file.
pub fn walk(base_dir: &Path) -> DiscoveryResult {
    let mut projects = Vec::new();
    let mut discovered_candidates = 0usize;
    let mut non_configured = Vec::new();

    let mut stack = vec![base_dir.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(mut entries) = std::fs::read_dir(&dir).map(|rd| {
            rd.flatten()
                .map(|entry| entry.path())
                .collect::<Vec<PathBuf>>()
        }) else {
            continue;
        };
        entries.sort();

        let mut candidates = Vec::new();
        for path in &entries {
            if path.is_dir() {
                let hidden = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with('.'))
                    .unwrap_or(false);
                if !hidden {
                    stack.push(path.clone());
                }
            } else if is_manifest_candidate(path) {
                candidates.push(path.clone());
            }
        }

        if candidates.is_empty() {
            continue;
        }
        discovered_candidates += candidates.len();

        match loader::load_project(&dir) {
            Ok(Some(project)) => projects.push(project),
            Ok(None) => {
                for candidate in &candidates {
                    non_configured.push(candidate.display().to_string());
                }
            }
            Err(err) => {
                tracing::warn!(dir = %dir.display(), error = %err, "skipping manifest");
                for candidate in &candidates {
                    non_configured.push(candidate.display().to_string());
                }
            }
        }
    }

    projects.sort_by(|a, b| a.manifest_path.cmp(&b.manifest_path));
    non_configured.sort();

    DiscoveryResult {
        projects,
        discovered_candidates,
        non_configured,
    }
}

fn is_manifest_candidate(path: &Path) -> bool {
    matches!(
        path.file_name().and_then(|n| n.to_str()),
        Some(name) if name == DECLARATIVE_FILENAME || name == PROGRAMMATIC_FILENAME
    )
}

#[cfg(test)]
#[path = "discover_tests.rs"]
mod tests;
