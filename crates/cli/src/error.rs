// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reporter/Stats Writer errors (§7's `InternalError`: schema validation or
//! unexpected invariant violation — never a Project's own classification).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write stats file {path}: {source}")]
    Write {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("stats artifact failed schema validation: {0}")]
    SchemaValidation(#[from] serde_json::Error),
}
