//! Errors reported to the host through [`Compilation::errors`].
//!
//! [`Compilation::errors`]: crate::host::Compilation::errors

use thiserror::Error;

/// A failure recorded during a build cycle.
///
/// Causes are kept as `anyhow::Error` and rendered with their full context
/// chain, so the message names the file and the step that failed.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Reading, compiling, rendering or saving one entry failed.
    #[error("{path}: {cause:#}")]
    Entry { path: String, cause: anyhow::Error },

    /// The entry lives inside a partials folder and was not emitted.
    #[error("{path}: is ignored")]
    Ignored { path: String },

    /// The entry pattern could not be expanded. Nothing was compiled.
    #[error("failed to enumerate entries `{pattern}`: {cause:#}")]
    Enumeration {
        pattern: String,
        cause: anyhow::Error,
    },

    /// Helpers, partials or a setup hook failed during refresh.
    #[error("setup failed: {0:#}")]
    Setup(anyhow::Error),
}

impl BuildError {
    /// Source file the error refers to, if it concerns a single entry.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Entry { path, .. } | Self::Ignored { path } => Some(path),
            Self::Enumeration { .. } | Self::Setup(_) => None,
        }
    }
}
