// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine-wide error types (§7 taxonomy).

use thiserror::Error;

/// Fatal: environment creation/install failed or timed out. Aborts the run
/// before any Pipeline Runner starts.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("adopted environment path {0} does not exist")]
    AdoptedPathMissing(std::path::PathBuf),
    #[error("adopted environment at {0} is missing an interpreter or installer executable")]
    AdoptedPathIncomplete(std::path::PathBuf),
    #[error("failed to create environment root at {path}: {source}")]
    CreateFailed {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("installer bootstrap failed: {0}")]
    InstallFailed(String),
    #[error("installer bootstrap timed out after {0:?}")]
    InstallTimeout(std::time::Duration),
}

/// Errors internal to one step's execution (distinct from the step's
/// recorded classification, which is never an error — see `StepOutcome`).
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Subprocess(#[from] qaorc_adapters::subprocess::SubprocessError),
}

/// `DiscoveryEmpty` per §7: no Projects found at all.
#[derive(Debug, Error)]
#[error("no projects discovered under the given base directory")]
pub struct DiscoveryEmptyError;
