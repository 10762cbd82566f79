//! Test helpers for behavioral specifications.
//!
//! Drives the built `qaorc` binary end-to-end with `assert_cmd`, against a
//! throwaway repository tree and an adopted fake interpreter environment
//! (so no real Python or network install is ever needed).

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use tempfile::TempDir;

/// A scratch repository tree `qaorc` discovers projects under.
pub struct Repo {
    dir: TempDir,
}

impl Repo {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create repo tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `relative` (creating parent directories) with `contents`.
    pub fn file(&self, relative: &str, contents: &str) -> &Self {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, contents).expect("write fixture file");
        self
    }

    /// Write a `.torc` manifest under `project_dir` (relative to the repo
    /// root) with the given `[ptr]` body.
    pub fn manifest(&self, project_dir: &str, ptr_body: &str) -> &Self {
        self.file(&format!("{project_dir}/.torc"), &format!("[ptr]\n{ptr_body}\n"))
    }
}

/// An adopted interpreter environment: `bin/python3` and `bin/pip`, both
/// scripted so a run never touches the network or a real Python install.
pub struct Venv {
    dir: TempDir,
}

impl Venv {
    /// `python3_body` is the shell script run in place of `python3`; `pip`
    /// always succeeds unconditionally (`pip_install` is unconditionally
    /// required by every pipeline run, so scenarios that don't care about
    /// it just need it to pass).
    pub fn new(python3_body: &str) -> Self {
        let dir = tempfile::tempdir().expect("create venv tempdir");
        let bin = dir.path().join("bin");
        fs::create_dir_all(&bin).expect("create venv bin dir");
        write_executable(&bin.join("pip"), "#!/bin/sh\nexit 0\n");
        write_executable(&bin.join("python3"), python3_body);
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(unix)]
fn write_executable(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;
    fs::write(path, body).expect("write fake interpreter script");
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("chmod fake interpreter");
}

/// A `qaorc` invocation rooted at `repo`, adopting `venv` so provisioning
/// never runs for real.
pub fn qaorc(repo: &Repo, venv: &Venv) -> Command {
    let mut cmd = Command::cargo_bin("qaorc").expect("locate qaorc binary");
    cmd.arg("--base-dir").arg(repo.path()).arg("--venv").arg(venv.path());
    cmd
}

pub const SPEC_POLL_INTERVAL_MS: u64 = 10;

/// Poll `check` every [`SPEC_POLL_INTERVAL_MS`] up to `max_ms`, returning
/// `true` as soon as it does.
pub fn wait_for(max_ms: u64, mut check: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + std::time::Duration::from_millis(max_ms);
    loop {
        if check() {
            return true;
        }
        if std::time::Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(std::time::Duration::from_millis(SPEC_POLL_INTERVAL_MS));
    }
}

/// A fake `python3` that passes every step: `coverage run` exits 0,
/// `coverage report -m` emits a report with a passing total.
pub const ALWAYS_PASS_PYTHON: &str = r#"#!/bin/sh
for arg in "$@"; do
  if [ "$arg" = "report" ]; then
    echo "Name              Stmts   Miss  Cover   Missing"
    echo "-----------------------------------------------"
    echo "pkg/__init__.py       4      0   100%"
    echo "-----------------------------------------------"
    echo "TOTAL                 4      0   100%"
    exit 0
  fi
done
exit 0
"#;

/// A fake `python3` whose `coverage run` step fails (non-zero exit); never
/// reaches `coverage report`.
pub const FAILING_TESTS_PYTHON: &str = r#"#!/bin/sh
for arg in "$@"; do
  if [ "$arg" = "run" ]; then
    echo "FAILED tests.test_thing"
    exit 1
  fi
done
exit 0
"#;

/// A fake `python3` whose `coverage run` step sleeps well past any short
/// `test_suite_timeout`, and an orderly exit otherwise.
pub const HANGING_TESTS_PYTHON: &str = r#"#!/bin/sh
for arg in "$@"; do
  if [ "$arg" = "run" ]; then
    sleep 30
    exit 0
  fi
done
exit 0
"#;

/// A fake `python3` that passes `tests_run` but reports coverage below any
/// reasonable `required_coverage` threshold.
pub const LOW_COVERAGE_PYTHON: &str = r#"#!/bin/sh
for arg in "$@"; do
  if [ "$arg" = "report" ]; then
    echo "Name              Stmts   Miss  Cover   Missing"
    echo "-----------------------------------------------"
    echo "pkg/__init__.py      20     15    25%   3-20"
    echo "-----------------------------------------------"
    echo "TOTAL                20     15    25%"
    exit 0
  fi
done
exit 0
"#;

/// A fake `python3` whose `coverage run` step sleeps briefly, long enough
/// to still be mid-flight when a cancellation arrives.
pub const SLOW_BUT_FINISHES_PYTHON: &str = r#"#!/bin/sh
for arg in "$@"; do
  if [ "$arg" = "run" ]; then
    sleep 2
    exit 0
  fi
done
exit 0
"#;
