// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parser for the declarative (`.torc`, INI-like) manifest form.
//!
//! Recognizes `[ptr]`-style sections with `key = value` pairs. Supports the
//! classic INI continuation-line convention (a more-indented line with no
//! `=` extends the previous key's value with an embedded newline), which is
//! how `required_coverage`'s `path = number` pairs are expressed as one
//! multi-line value.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::ManifestError;

/// One `[section]` block's raw key -> value pairs, values as written.
pub type RawSection = HashMap<String, String>;

/// Parse all `[section]` blocks in `content` into raw string key-value maps.
pub fn parse_sections(
    path: &Path,
    content: &str,
) -> Result<HashMap<String, RawSection>, ManifestError> {
    let mut sections: HashMap<String, RawSection> = HashMap::new();
    let mut current_section: Option<String> = None;
    let mut current_key: Option<String> = None;

    for raw_line in content.lines() {
        let line = raw_line.trim_end();
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        if trimmed.starts_with('[') {
            let Some(end) = trimmed.find(']') else {
                return Err(ManifestError::MalformedSection {
                    path: path.to_path_buf(),
                    section: trimmed.to_string(),
                    message: "missing closing ']'".to_string(),
                });
            };
            let name = trimmed[1..end].trim().to_string();
            sections.entry(name.clone()).or_default();
            current_section = Some(name);
            current_key = None;
            continue;
        }

        // Continuation line: indented relative to the original, no key present yet
        // to attach to is an error; otherwise append to the last value.
        if line.starts_with(' ') || line.starts_with('\t') {
            let Some(section_name) = current_section.as_ref() else {
                continue;
            };
            let Some(key) = current_key.clone() else {
                continue;
            };
            let section = sections.entry(section_name.clone()).or_default();
            if let Some(existing) = section.get_mut(&key) {
                existing.push('\n');
                existing.push_str(trimmed);
            }
            continue;
        }

        let Some(section_name) = current_section.clone() else {
            continue;
        };
        let (key, value) = split_key_value(trimmed);
        let section = sections.entry(section_name).or_default();
        section.insert(key.clone(), value.to_string());
        current_key = Some(key);
    }

    Ok(sections)
}

fn split_key_value(line: &str) -> (String, &str) {
    let sep_pos = line.find(['=', ':']).unwrap_or(line.len());
    let key = line[..sep_pos].trim().to_string();
    let value = if sep_pos < line.len() {
        line[sep_pos + 1..].trim()
    } else {
        ""
    };
    (key, value)
}

/// Coerce a raw scalar to a bool per §4.1: {true, false, yes, no, 1, 0}
/// case-insensitively.
pub fn coerce_bool(path: &Path, key: &str, raw: &str) -> Result<bool, ManifestError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(ManifestError::TypeCoercion {
            path: path.to_path_buf(),
            key: key.to_string(),
            raw: raw.to_string(),
        }),
    }
}

/// Coerce a raw scalar to an integer via decimal parsing.
pub fn coerce_int(path: &Path, key: &str, raw: &str) -> Result<u64, ManifestError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ManifestError::TypeCoercion {
            path: path.to_path_buf(),
            key: key.to_string(),
            raw: raw.to_string(),
        })
}

/// Coerce a raw scalar to a whitespace-separated token list.
pub fn coerce_list(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

/// Parse `required_coverage`'s multi-line `path = number` pairs.
pub fn coerce_coverage_map(
    path: &Path,
    key: &str,
    raw: &str,
) -> Result<HashMap<String, f64>, ManifestError> {
    let mut map = HashMap::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (entry_key, entry_value) = split_key_value(line);
        let value: f64 = entry_value
            .trim()
            .parse()
            .map_err(|_| ManifestError::TypeCoercion {
                path: path.to_path_buf(),
                key: key.to_string(),
                raw: line.to_string(),
            })?;
        map.insert(entry_key, value);
    }
    Ok(map)
}

/// Parse `required_coverage_pct`'s flat `{path: percent}` back-compat form.
/// Same shape as `coerce_coverage_map`; kept as a distinct name for clarity
/// at call sites since the two keys have separate precedence rules.
pub fn coerce_coverage_pct_map(
    path: &Path,
    key: &str,
    raw: &str,
) -> Result<HashMap<String, f64>, ManifestError> {
    coerce_coverage_map(path, key, raw)
}

/// Root-level defaults filename, discovered by walking parents.
pub const DEFAULTS_FILENAME: &str = ".torc";

/// Walk from `project_dir`'s parent up to the filesystem root looking for a
/// defaults file (the project's own manifest, even if also named
/// `.torc`, is never considered a defaults file for itself). Returns the
/// first one found, or `None` if none exists.
pub fn find_defaults_file(project_dir: &Path) -> Option<PathBuf> {
    let mut dir = project_dir.parent()?;
    loop {
        let candidate = dir.join(DEFAULTS_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

#[cfg(test)]
#[path = "declarative_tests.rs"]
mod tests;
