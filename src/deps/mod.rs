//! Dependency tracking for incremental builds.
//!
//! Two layers:
//! - [`DependencySet`]: every file the plugin has read (entries, partials,
//!   helper scripts, data files, companion templates)
//! - [`detect`]: strategies that decide from the host's change information
//!   whether any of those files changed
//!
//! # Invariants
//! - Paths are absolute and slash-normalized for reliable matching
//! - No duplicates; insertion order is kept for reproducible diagnostics
//! - The set only grows, until [`DependencySet::clear`] is called

pub mod detect;

pub use detect::{ChangeDetector, ModifiedFilesDetector, TimestampDetector, select_detector};

use indexmap::IndexSet;
use std::path::Path;

use crate::utils::path::{absolute_slash_path, normalize_slashes};

/// Normalize a path to the form stored in a [`DependencySet`].
///
/// Returns `None` for empty input.
pub fn dependency_key(path: &str) -> Option<String> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(absolute_slash_path(Path::new(&normalize_slashes(trimmed))))
}

/// De-duplicated, insertion-ordered set of watched files.
#[derive(Debug, Default, Clone)]
pub struct DependencySet {
    paths: IndexSet<String>,
}

impl DependencySet {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, returning `true` if it was not tracked yet.
    ///
    /// Empty paths are ignored.
    pub fn add(&mut self, path: &str) -> bool {
        dependency_key(path).is_some_and(|key| self.paths.insert(key))
    }

    /// Add several files.
    pub fn extend<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for path in paths {
            self.add(path.as_ref());
        }
    }

    /// Whether a file is tracked. The path is normalized before lookup.
    pub fn contains(&self, path: &str) -> bool {
        dependency_key(path).is_some_and(|key| self.paths.contains(&key))
    }

    /// Tracked paths in insertion order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.paths.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.paths.clear();
    }
}
