//! Scenario 5 (spec.md §8): five projects, concurrency 2, interrupted
//! shortly after the run starts. Unstarted and in-flight projects are
//! `skipped-cancelled`; the run exits non-zero well before the slow
//! projects would otherwise finish.

use crate::prelude::*;
use std::time::{Duration, Instant};

const CANCELLATION_PYTHON: &str = r#"#!/bin/sh
if [ "$3" = "run" ]; then
  sleep 3
  exit 0
fi
exit 0
"#;

#[test]
fn interrupt_mid_run_cancels_remaining_projects() {
    let repo = Repo::empty();
    for i in 0..5 {
        repo.manifest(
            &format!("proj{i}"),
            &format!("entry_point_module = proj{i}\ntest_suite = proj{i}.tests\ntest_suite_timeout = 10\n"),
        );
    }
    let venv = Venv::new(CANCELLATION_PYTHON);

    let stats_path = repo.path().join("stats.json");
    let mut child = qaorc(&repo, &venv)
        .arg("--atonce")
        .arg("2")
        .arg("--stats-file")
        .arg(&stats_path)
        .spawn()
        .expect("spawn qaorc");

    std::thread::sleep(Duration::from_millis(300));
    let status = std::process::Command::new("kill")
        .arg("-INT")
        .arg(child.id().to_string())
        .status()
        .expect("send SIGINT");
    assert!(status.success(), "kill -INT failed");

    let start = Instant::now();
    let output = child.wait_with_output().expect("wait for qaorc");
    let elapsed = start.elapsed();

    assert_eq!(output.status.code(), Some(130));
    // Every slow project sleeps 3s; a working cancellation must not wait
    // for all five to finish (15s serialized, or even 2*3s at concurrency 2).
    assert!(elapsed < Duration::from_secs(5), "cancellation took too long: {elapsed:?}");

    let stats: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&stats_path).expect("read stats file"))
            .expect("parse stats json");
    assert_eq!(stats["total_suites"], 5);
    let suites = stats["suites"].as_object().expect("suites object");
    let skipped = suites.values().filter(|s| s["result"] == "skipped").count();
    assert!(skipped >= 3, "expected at least 3 cancelled projects, stats: {stats}");
    assert_eq!(stats["fail"], 0);
    assert_eq!(stats["timeout"], 0);
}
