//! Utility modules for the template plugin.

pub mod path;
