// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment Provisioner: creates or adopts the one interpreter
//! environment shared by all Pipeline Runners in a run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use qaorc_core::id::{IdGen, UuidIdGen};
use qaorc_core::project::{Environment, EnvironmentOwnership};

use crate::error::ProvisionError;

/// Request parameters for provisioning (§4.3).
#[derive(Debug, Clone, Default)]
pub struct ProvisionRequest {
    pub adopt_path: Option<PathBuf>,
    pub mirror_url: Option<String>,
    pub system_site_packages: bool,
    pub base_requirements: Vec<String>,
    pub timeout: Duration,
}

#[cfg(unix)]
fn interpreter_name() -> &'static str {
    "python3"
}

#[cfg(unix)]
fn installer_name() -> &'static str {
    "pip"
}

#[cfg(not(unix))]
fn interpreter_name() -> &'static str {
    "python.exe"
}

#[cfg(not(unix))]
fn installer_name() -> &'static str {
    "pip.exe"
}

#[cfg(unix)]
fn bin_dir(root: &Path) -> PathBuf {
    root.join("bin")
}

#[cfg(not(unix))]
fn bin_dir(root: &Path) -> PathBuf {
    root.join("Scripts")
}

/// Verify an adopted environment path exists and contains the expected
/// executables, or create a fresh one and bootstrap it.
pub async fn provision(request: ProvisionRequest) -> Result<Environment, ProvisionError> {
    if let Some(adopt_path) = request.adopt_path.clone() {
        return adopt(adopt_path);
    }
    create_and_bootstrap(request).await
}

fn adopt(path: PathBuf) -> Result<Environment, ProvisionError> {
    if !path.is_dir() {
        return Err(ProvisionError::AdoptedPathMissing(path));
    }
    let interpreter = bin_dir(&path).join(interpreter_name());
    let installer = bin_dir(&path).join(installer_name());
    if !interpreter.is_file() || !installer.is_file() {
        return Err(ProvisionError::AdoptedPathIncomplete(path));
    }
    Ok(Environment {
        root: path,
        interpreter,
        installer,
        ownership: EnvironmentOwnership::Adopted,
        mirror_url: None,
        system_site_packages: false,
    })
}

async fn create_and_bootstrap(
    request: ProvisionRequest,
) -> Result<Environment, ProvisionError> {
    let id_gen = UuidIdGen;
    let root = std::env::temp_dir().join(format!("qaorc-venv-{}", id_gen.next()));
    std::fs::create_dir_all(&root).map_err(|source| ProvisionError::CreateFailed {
        path: root.clone(),
        source,
    })?;

    let interpreter = bin_dir(&root).join(interpreter_name());
    let installer = bin_dir(&root).join(installer_name());

    let env = Environment {
        root: root.clone(),
        interpreter,
        installer,
        ownership: EnvironmentOwnership::Created,
        mirror_url: request.mirror_url.clone(),
        system_site_packages: request.system_site_packages,
    };

    bootstrap(&env, &request).await?;
    Ok(env)
}

/// Run the installer within the environment to upgrade itself and install
/// the base-requirement list, bounded by `request.timeout`.
async fn bootstrap(env: &Environment, request: &ProvisionRequest) -> Result<(), ProvisionError> {
    let mut argv = vec!["install".to_string(), "--upgrade".to_string(), "pip".to_string()];
    argv.extend(request.base_requirements.iter().cloned());

    let mut cmd = tokio::process::Command::new(&env.installer);
    cmd.args(&argv).current_dir(&env.root);
    if let Some(mirror) = &env.mirror_url {
        cmd.arg("--index-url").arg(mirror);
    }

    let outcome = qaorc_adapters::run_with_timeout(
        cmd,
        request.timeout,
        qaorc_adapters::DEFAULT_GRACE_PERIOD,
        "environment bootstrap",
        None,
    )
    .await
    .map_err(|e| ProvisionError::InstallFailed(e.to_string()))?;

    if outcome.timed_out {
        return Err(ProvisionError::InstallTimeout(request.timeout));
    }
    if outcome.exit_status != Some(0) {
        return Err(ProvisionError::InstallFailed(outcome.output));
    }
    Ok(())
}

/// Release discipline (§4.3): delete an owned, non-kept environment root.
/// Adopted environments are never deleted. Idempotent on a missing root.
pub fn release(env: &Environment, keep: bool) -> std::io::Result<()> {
    if env.is_owned() && !keep {
        match std::fs::remove_dir_all(&env.root) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    } else {
        Ok(())
    }
}

#[cfg(test)]
#[path = "provision_tests.rs"]
mod tests;
