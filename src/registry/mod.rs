//! Helper and partial discovery and registration.
//!
//! Both are resolved from configuration (inline values or glob patterns) into
//! concrete entries, then registered with the plugin's [`EngineHandle`].
//! Nothing is diffed: every refresh resolves and registers the full set again,
//! which is what makes edited helper scripts and partials visible on the next
//! build cycle.
//!
//! Id collisions are last-write-wins. Two helper files mapping to the same id
//! log a warning; two partials mapping to the same id replace each other
//! silently.
//!
//! [`EngineHandle`]: crate::engine::EngineHandle

pub mod helpers;
pub mod partials;

pub use helpers::{
    HelperBody, HelperEntry, HelperFactory, HelperQuery, helper_id, register_helpers,
    resolve_helpers,
};
pub use partials::{
    PartialIdGenerator, PartialMap, default_partial_id, register_partials, resolve_partials,
};
