// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment variable handling for subprocess I/O.

/// The variable forced on every step subprocess to guarantee UTF-8 I/O
/// regardless of the host locale.
pub const UTF8_LOCALE_VAR: &str = "PYTHONIOENCODING";
pub const UTF8_LOCALE_VALUE: &str = "utf-8";

/// Build the environment-variable overrides applied to every step subprocess:
/// the UTF-8 forcing variable, the run-scoped coverage-data-file location,
/// and any user-supplied overrides (applied last, so they can win).
pub fn build_step_env(
    coverage_data_file: Option<&str>,
    user_overrides: &[(String, String)],
) -> Vec<(String, String)> {
    let mut vars = vec![(UTF8_LOCALE_VAR.to_string(), UTF8_LOCALE_VALUE.to_string())];
    if let Some(path) = coverage_data_file {
        vars.push(("COVERAGE_FILE".to_string(), path.to_string()));
    }
    vars.extend(user_overrides.iter().cloned());
    vars
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
