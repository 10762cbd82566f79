//! Scenario 6 (spec.md §8): `--venv PATH` adopts an existing environment;
//! the Provisioner verifies it rather than creating one, and the path
//! survives the run regardless of `--keep-venv`.

use crate::prelude::*;

#[test]
fn adopted_environment_survives_with_or_without_keep_venv() {
    for keep_venv in [false, true] {
        let repo = Repo::empty();
        repo.manifest(
            "proj",
            "entry_point_module = proj\ntest_suite = proj.tests\ntest_suite_timeout = 10\n",
        );
        let venv = Venv::new(ALWAYS_PASS_PYTHON);

        let mut cmd = qaorc(&repo, &venv);
        if keep_venv {
            cmd.arg("--keep-venv");
        }
        let output = cmd.output().expect("run qaorc");

        assert_eq!(output.status.code(), Some(0), "keep_venv={keep_venv}: {output:?}");
        assert!(
            venv.path().join("bin").join("python3").is_file(),
            "adopted environment must never be deleted, keep_venv={keep_venv}"
        );
    }
}
