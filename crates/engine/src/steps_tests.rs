// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use qaorc_core::project::EnvironmentOwnership;
use std::collections::HashMap;

fn project(flags: EnableFlags, requires_coverage: bool) -> Project {
    let mut coverage = HashMap::new();
    if requires_coverage {
        coverage.insert("TOTAL".to_string(), 90.0);
    }
    Project::new(
        PathBuf::from("/repo/foo/.torc"),
        "foo".into(),
        "foo.tests".into(),
        30,
        coverage,
        flags,
        false,
        vec![],
    )
    .unwrap()
}

fn environment() -> Environment {
    Environment {
        root: PathBuf::from("/tmp/venv"),
        interpreter: PathBuf::from("/tmp/venv/bin/python3"),
        installer: PathBuf::from("/tmp/venv/bin/pip"),
        ownership: EnvironmentOwnership::Created,
        mirror_url: None,
        system_site_packages: false,
    }
}

#[test]
fn pip_install_and_tests_run_always_guarded_true() {
    let flags = EnableFlags::default();
    assert!(run_guard(StepName::PipInstall, &flags, false));
    assert!(run_guard(StepName::TestsRun, &flags, false));
}

#[test]
fn analyze_coverage_guarded_by_requires_coverage_not_flags() {
    let flags = EnableFlags::default();
    assert!(!run_guard(StepName::AnalyzeCoverage, &flags, false));
    assert!(run_guard(StepName::AnalyzeCoverage, &flags, true));
}

#[test]
fn independent_steps_guarded_by_their_own_flag() {
    let flags = EnableFlags {
        run_mypy: true,
        ..Default::default()
    };
    assert!(run_guard(StepName::MypyRun, &flags, false));
    assert!(!run_guard(StepName::BlackRun, &flags, false));
    assert!(!run_guard(StepName::PyreRun, &flags, false));
}

#[test]
fn tests_run_timeout_inherits_project_setting() {
    let project = project(EnableFlags::default(), false);
    assert_eq!(timeout_for(StepName::TestsRun, &project), Duration::from_secs(30));
}

#[test]
fn other_steps_use_default_timeout() {
    let project = project(EnableFlags::default(), false);
    assert_eq!(timeout_for(StepName::MypyRun, &project), DEFAULT_STEP_TIMEOUT);
}

#[test]
fn argv_for_tests_run_invokes_coverage_with_test_suite() {
    let project = project(EnableFlags::default(), false);
    let env = environment();
    let ctx = StepContext {
        project: &project,
        environment: &env,
        coverage_data_file: PathBuf::from("/repo/foo/.qaorc-coverage"),
        error_on_warnings: false,
        extra_tool_args: &[],
        cancel: None,
    };
    let argv = argv_for(StepName::TestsRun, &ctx);
    assert!(argv.contains(&"coverage".to_string()));
    assert!(argv.contains(&"foo.tests".to_string()));
}

#[test]
fn error_on_warnings_appends_warning_flag_to_tests_run_only() {
    let project = project(EnableFlags::default(), false);
    let env = environment();
    let ctx = StepContext {
        project: &project,
        environment: &env,
        coverage_data_file: PathBuf::from("/repo/foo/.qaorc-coverage"),
        error_on_warnings: true,
        extra_tool_args: &[],
        cancel: None,
    };
    let tests_argv = argv_for(StepName::TestsRun, &ctx);
    assert!(tests_argv.iter().any(|a| a == "error"));
    let mypy_argv = argv_for(StepName::MypyRun, &ctx);
    assert!(!mypy_argv.iter().any(|a| a == "error"));
}

#[tokio::test]
async fn run_step_classifies_pass() {
    let project = project(EnableFlags::default(), false);
    let env = Environment {
        interpreter: PathBuf::from("true"),
        ..environment()
    };
    let ctx = StepContext {
        project: &project,
        environment: &env,
        coverage_data_file: PathBuf::from("/tmp/.qaorc-coverage"),
        error_on_warnings: false,
        extra_tool_args: &[],
        cancel: None,
    };
    // `true -m coverage run -m foo.tests` fails (argv is nonsense for `true`,
    // which ignores its args and exits 0 regardless).
    let outcome = run_step(StepName::TestsRun, &ctx).await.unwrap();
    assert_eq!(outcome.result, StepResult::Pass);
}
