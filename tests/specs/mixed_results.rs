//! Scenario 4 (spec.md §8): three projects — one passes, one fails
//! `mypy_run`, one times out in `tests_run`.

use crate::prelude::*;

const MIXED_PYTHON: &str = r#"#!/bin/sh
if [ "$3" = "run" ]; then
  case "$5" in
    gamma.tests) sleep 30 ;;
  esac
  exit 0
fi
if [ "$2" = "mypy" ]; then
  case "$3" in
    beta) exit 1 ;;
    *) exit 0 ;;
  esac
fi
exit 0
"#;

#[test]
fn one_pass_one_fail_one_timeout() {
    let repo = Repo::empty();
    repo.manifest(
        "alpha",
        "entry_point_module = alpha\ntest_suite = alpha.tests\ntest_suite_timeout = 10\nrun_mypy = true\n",
    );
    repo.manifest(
        "beta",
        "entry_point_module = beta\ntest_suite = beta.tests\ntest_suite_timeout = 10\nrun_mypy = true\n",
    );
    repo.manifest(
        "gamma",
        "entry_point_module = gamma\ntest_suite = gamma.tests\ntest_suite_timeout = 2\n",
    );
    let venv = Venv::new(MIXED_PYTHON);

    let output = qaorc(&repo, &venv).output().expect("run qaorc");

    assert_ne!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("PASS: 1 FAIL: 1 TIMEOUT: 1 TOTAL: 3"),
        "unexpected summary: {stdout}"
    );

    let beta_pos = stdout.find("beta").expect("beta block present");
    let gamma_pos = stdout.find("gamma").expect("gamma block present");
    assert!(beta_pos < gamma_pos, "failing blocks should be in discovery order: {stdout}");
    assert!(!stdout.contains("alpha"), "alpha passed and should have no output block: {stdout}");
}
