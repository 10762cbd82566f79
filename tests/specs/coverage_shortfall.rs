//! Scenario 2 (spec.md §8): a project declares `required_coverage` for a
//! file and `TOTAL`; the coverage report comes in under both thresholds.

use crate::prelude::*;

const SHORTFALL_PYTHON: &str = r#"#!/bin/sh
if [ "$3" = "report" ]; then
  echo "Name     Stmts   Miss  Cover   Missing"
  echo "------------------------------------"
  echo "lib.py      20     16    84%   3-20"
  echo "------------------------------------"
  echo "TOTAL       20     16    84%"
  exit 0
fi
exit 0
"#;

#[test]
fn coverage_below_threshold_fails_at_analyze_coverage() {
    let repo = Repo::empty();
    repo.manifest(
        "proj",
        "entry_point_module = proj\ntest_suite = proj.tests\ntest_suite_timeout = 10\nrequired_coverage = lib.py = 99\n    TOTAL = 99\n",
    );
    let venv = Venv::new(SHORTFALL_PYTHON);

    let stats_path = repo.path().join("stats.json");
    let output = qaorc(&repo, &venv)
        .arg("--stats-file")
        .arg(&stats_path)
        .output()
        .expect("run qaorc");

    assert_ne!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("lib.py: 84 < 99"), "missing shortfall line: {stdout}");

    let stats: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&stats_path).expect("read stats file"))
            .expect("parse stats json");
    assert_eq!(stats["fail"], 1);
    let suite = stats["suites"].as_object().expect("suites object").values().next().expect("one suite");
    assert_eq!(suite["result"], "fail");
    assert_eq!(suite["failed_step"], "analyze_coverage");
}
