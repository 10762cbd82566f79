// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Manifest parsing and discovery errors.

use std::path::PathBuf;
use thiserror::Error;

/// Per-candidate manifest errors. All variants are warn-and-skip at the
/// Discovery Walker level — none of them abort a run.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("{path}: unreadable: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: malformed [{section}] section: {message}")]
    MalformedSection {
        path: PathBuf,
        section: String,
        message: String,
    },
    #[error("{path}: {key} could not be coerced to the expected type: {raw}")]
    TypeCoercion {
        path: PathBuf,
        key: String,
        raw: String,
    },
    #[error("{path}: {identifier} right-hand side is not a literal mapping")]
    NonLiteralValue { path: PathBuf, identifier: String },
    #[error("{path}: manifest has no parent directory")]
    NoWorkingDirectory { path: PathBuf },
}
