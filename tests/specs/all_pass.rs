//! Scenario 1 (spec.md §8): two manifests, each enabling `run_mypy` only,
//! both tools exit 0.

use crate::prelude::*;

#[test]
fn two_passing_projects_report_pass_pass() {
    let repo = Repo::empty();
    repo.manifest(
        "alpha",
        "entry_point_module = alpha\ntest_suite = alpha.tests\ntest_suite_timeout = 10\nrun_mypy = true\n",
    );
    repo.manifest(
        "beta",
        "entry_point_module = beta\ntest_suite = beta.tests\ntest_suite_timeout = 10\nrun_mypy = true\n",
    );
    let venv = Venv::new(ALWAYS_PASS_PYTHON);

    let stats_path = repo.path().join("stats.json");
    let output = qaorc(&repo, &venv)
        .arg("--stats-file")
        .arg(&stats_path)
        .output()
        .expect("run qaorc");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("PASS: 2 FAIL: 0 TIMEOUT: 0 TOTAL: 2"),
        "unexpected summary: {stdout}"
    );

    let stats: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&stats_path).expect("read stats file"))
            .expect("parse stats json");
    assert_eq!(stats["pass"], 2);
    assert_eq!(stats["fail"], 0);
    assert_eq!(stats["total_suites"], 2);
    let suites = stats["suites"].as_object().expect("suites object");
    assert_eq!(suites.len(), 2);
    for (_, entry) in suites {
        assert_eq!(entry["result"], "pass");
    }
}
