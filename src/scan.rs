//! Glob expansion for entries, partials and helpers.
//!
//! Results are slash-normalized file paths in sorted order, so entry
//! compilation and log output are deterministic across platforms.

use anyhow::{Context, Result};

use crate::utils::path::normalize_slashes;

/// Expand a glob pattern into the sorted list of matching files.
///
/// Directories are skipped. An invalid pattern or an unreadable directory
/// is an error.
pub fn expand(pattern: &str) -> Result<Vec<String>> {
    let pattern = normalize_slashes(pattern);
    let paths =
        glob::glob(&pattern).with_context(|| format!("invalid glob pattern `{pattern}`"))?;

    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.with_context(|| format!("failed to expand `{pattern}`"))?;
        if path.is_file() {
            matches.push(normalize_slashes(&path.to_string_lossy()));
        }
    }

    matches.sort();
    matches.dedup();
    Ok(matches)
}

/// Expand several patterns, keeping pattern order and sorting within each.
pub fn expand_all<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<String>> {
    let mut matches = Vec::new();
    for pattern in patterns {
        matches.extend(expand(pattern.as_ref())?);
    }
    Ok(matches)
}

/// Whether a string contains glob wildcards.
#[inline]
pub fn is_pattern(value: &str) -> bool {
    value.contains(['*', '?', '[', '{'])
}
