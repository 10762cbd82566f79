//! Scenario 3 (spec.md §8): `test_suite_timeout = 2`, the test suite sleeps
//! far longer; the step is classified `timeout` and no later step runs.

use crate::prelude::*;
use std::time::Instant;

#[test]
fn hanging_test_suite_times_out() {
    let repo = Repo::empty();
    repo.manifest(
        "proj",
        "entry_point_module = proj\ntest_suite = proj.tests\ntest_suite_timeout = 2\nrun_mypy = true\n",
    );
    let venv = Venv::new(HANGING_TESTS_PYTHON);

    let stats_path = repo.path().join("stats.json");
    let start = Instant::now();
    let output = qaorc(&repo, &venv)
        .arg("--stats-file")
        .arg(&stats_path)
        .output()
        .expect("run qaorc");
    let elapsed = start.elapsed();

    assert_ne!(output.status.code(), Some(0));
    // 2s timeout + 5s grace period; the child must be reaped well inside that.
    assert!(elapsed < std::time::Duration::from_secs(15), "took {elapsed:?}");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("PASS: 0 FAIL: 0 TIMEOUT: 1 TOTAL: 1"), "unexpected summary: {stdout}");
    assert!(stdout.contains("(failed 'tests_run' step):"), "missing tests_run block: {stdout}");
    // mypy_run is ordered after the required tests_run step and never runs.
    assert!(!stdout.contains("'mypy_run' step"), "mypy_run should not have run: {stdout}");

    let stats: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&stats_path).expect("read stats file"))
            .expect("parse stats json");
    assert_eq!(stats["timeout"], 1);
    let suite = stats["suites"].as_object().expect("suites object").values().next().expect("one suite");
    assert_eq!(suite["result"], "timeout");
    assert_eq!(suite["failed_step"], "tests_run");
}
