//! Change detection strategies.
//!
//! Hosts report changes in one of two ways, fixed for the lifetime of the
//! plugin:
//!
//! | Capability                        | Strategy                  |
//! |-----------------------------------|---------------------------|
//! | [`HostCapability::ModifiedFiles`] | [`ModifiedFilesDetector`] |
//! | [`HostCapability::Timestamps`]    | [`TimestampDetector`]     |
//!
//! Both honor the same contract: no tracked file touched means skip the
//! cycle, any tracked file touched means rebuild, and the first cycle always
//! builds.

use rustc_hash::{FxHashMap, FxHashSet};
use std::time::SystemTime;

use super::{DependencySet, dependency_key};
use crate::host::{Compilation, HostCapability};

/// Decides whether a build cycle has to recompile.
pub trait ChangeDetector {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Whether the change information in `compilation` touches `dependencies`.
    fn has_changes(&mut self, dependencies: &DependencySet, compilation: &Compilation) -> bool;
}

/// Pick the strategy matching what the host can report.
pub fn select_detector(capability: HostCapability) -> Box<dyn ChangeDetector> {
    match capability {
        HostCapability::ModifiedFiles => Box::new(ModifiedFilesDetector),
        HostCapability::Timestamps => Box::new(TimestampDetector::new()),
    }
}

// =============================================================================
// Modified-file set
// =============================================================================

/// Looks tracked files up in the host's set of modified files.
///
/// A missing set means the host has nothing to compare against yet (first
/// run) and always triggers a rebuild.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModifiedFilesDetector;

impl ChangeDetector for ModifiedFilesDetector {
    fn name(&self) -> &'static str {
        "modified-files"
    }

    fn has_changes(&mut self, dependencies: &DependencySet, compilation: &Compilation) -> bool {
        let Some(modified) = &compilation.modified_files else {
            return true;
        };

        let modified: FxHashSet<String> = modified
            .iter()
            .filter_map(|path| dependency_key(&path.to_string_lossy()))
            .collect();
        dependencies.iter().any(|dep| modified.contains(dep))
    }
}

// =============================================================================
// Timestamp diffing
// =============================================================================

/// Diffs the host's file timestamps against the previous snapshot.
///
/// A file counts as changed when its new timestamp is later than the
/// previous one (the detector's creation time if there is none) or when the
/// host could not report a timestamp. A cycle with no changed file at all
/// rebuilds, which covers the first run.
#[derive(Debug, Clone)]
pub struct TimestampDetector {
    start_time: SystemTime,
    previous: FxHashMap<String, SystemTime>,
}

impl Default for TimestampDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl TimestampDetector {
    pub fn new() -> Self {
        Self::starting_at(SystemTime::now())
    }

    /// Detector whose baseline for unseen files is `start_time`.
    pub fn starting_at(start_time: SystemTime) -> Self {
        Self {
            start_time,
            previous: FxHashMap::default(),
        }
    }

    fn changed_files(&self, snapshot: &FxHashMap<String, Option<SystemTime>>) -> Vec<String> {
        snapshot
            .iter()
            .filter(|(path, current)| {
                let previous = self.previous.get(*path).copied().unwrap_or(self.start_time);
                current.is_none_or(|time| time > previous)
            })
            .map(|(path, _)| path.clone())
            .collect()
    }
}

impl ChangeDetector for TimestampDetector {
    fn name(&self) -> &'static str {
        "timestamps"
    }

    fn has_changes(&mut self, dependencies: &DependencySet, compilation: &Compilation) -> bool {
        let snapshot: FxHashMap<String, Option<SystemTime>> = compilation
            .file_timestamps
            .iter()
            .filter_map(|(path, time)| Some((dependency_key(&path.to_string_lossy())?, *time)))
            .collect();

        let changed = self.changed_files(&snapshot);
        let rebuild = changed.is_empty() || changed.iter().any(|path| dependencies.contains(path));

        self.previous = snapshot
            .into_iter()
            .filter_map(|(path, time)| time.map(|time| (path, time)))
            .collect();

        rebuild
    }
}
