//! Host build-system contract.
//!
//! The host owns scheduling. Once per build cycle it creates a
//! [`Compilation`], calls [`TemplatePlugin::compile`] in its build phase and
//! [`TemplatePlugin::emit`] in its emit phase, then serves or writes
//! `compilation.assets` itself. Both calls return exactly once, which is the
//! host's completion signal.
//!
//! [`TemplatePlugin::compile`]: crate::TemplatePlugin::compile
//! [`TemplatePlugin::emit`]: crate::TemplatePlugin::emit

use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::PathBuf;
use std::time::SystemTime;

use crate::error::BuildError;

/// How the host reports changed files between cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HostCapability {
    /// The host knows the exact set of modified files.
    #[default]
    ModifiedFiles,
    /// The host only exposes per-file timestamps.
    Timestamps,
}

/// One generated output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    content: String,
}

impl Asset {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Size of the content in bytes (UTF-8).
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.content.len()
    }
}

/// State the host shares with the plugin for a single build cycle.
#[derive(Debug, Default)]
pub struct Compilation {
    /// Managed output directory. Targets below it become assets.
    pub output_path: PathBuf,
    /// Files the host should watch, absolute and slash-normalized.
    pub file_dependencies: IndexSet<String>,
    /// Generated files keyed by path relative to `output_path`.
    pub assets: IndexMap<String, Asset>,
    /// Error collector. Failures are pushed here instead of aborting.
    pub errors: Vec<BuildError>,
    /// Non-fatal diagnostics.
    pub warnings: Vec<String>,
    /// Files modified since the last cycle; `None` on the first run.
    pub modified_files: Option<FxHashSet<PathBuf>>,
    /// Per-file timestamps; `None` values mean the host could not stat the file.
    pub file_timestamps: FxHashMap<PathBuf, Option<SystemTime>>,
}

impl Compilation {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            ..Self::default()
        }
    }

    /// Attach the set of files modified since the previous cycle.
    pub fn with_modified_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.modified_files = Some(files.into_iter().map(Into::into).collect());
        self
    }

    /// Attach a timestamp snapshot.
    pub fn with_timestamps<I, P>(mut self, timestamps: I) -> Self
    where
        I: IntoIterator<Item = (P, Option<SystemTime>)>,
        P: Into<PathBuf>,
    {
        self.file_timestamps = timestamps
            .into_iter()
            .map(|(path, time)| (path.into(), time))
            .collect();
        self
    }

    #[inline]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_byte_len_counts_utf8_bytes() {
        let asset = Asset::new("héllo");
        assert_eq!(asset.content(), "héllo");
        assert_eq!(asset.byte_len(), 6);
    }

    #[test]
    fn test_compilation_defaults() {
        let compilation = Compilation::new("/dist");
        assert_eq!(compilation.output_path, PathBuf::from("/dist"));
        assert!(compilation.modified_files.is_none());
        assert!(!compilation.has_errors());
    }

    #[test]
    fn test_with_modified_files() {
        let compilation = Compilation::new("/dist").with_modified_files(["/src/a.hbs"]);
        assert!(
            compilation
                .modified_files
                .unwrap()
                .contains(&PathBuf::from("/src/a.hbs"))
        );
    }
}
