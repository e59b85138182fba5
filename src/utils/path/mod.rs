//! Path utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`fs`]: slash normalization and string-level splitting

pub mod fs;

pub use fs::{absolute_slash_path, basename, dirname, normalize_slashes, strip_extension};
