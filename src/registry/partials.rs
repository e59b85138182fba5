//! Partial resolution and registration.

use std::fs;

use anyhow::{Context, Result};
use indexmap::IndexMap;

use crate::engine::EngineHandle;
use crate::utils::path::{normalize_slashes, strip_extension};
use crate::{log, scan};

/// Maps a partial's file path to its id.
pub type PartialIdGenerator = Box<dyn Fn(&str) -> String>;

/// Partial id → normalized file path, in discovery order.
pub type PartialMap = IndexMap<String, String>;

/// Default partial id: parent folder and file name without extension.
///
/// `/src/partials/a.hbs` → `partials/a`
pub fn default_partial_id(filepath: &str) -> String {
    let path = normalize_slashes(filepath);
    let stem = strip_extension(&path);
    let mut segments = stem.rsplitn(3, '/');
    match (segments.next(), segments.next()) {
        (Some(name), Some(folder)) if !folder.is_empty() => format!("{folder}/{name}"),
        (Some(name), _) => name.to_string(),
        _ => stem.to_string(),
    }
}

/// Expand partial patterns into an id → path map.
///
/// A later file with an already used id replaces the earlier one.
pub fn resolve_partials(
    id_generator: &dyn Fn(&str) -> String,
    patterns: &[String],
) -> Result<PartialMap> {
    let mut partials = PartialMap::new();
    for filepath in scan::expand_all(patterns)? {
        partials.insert(id_generator(&filepath), filepath);
    }
    Ok(partials)
}

/// Read every partial file and register its text under its id.
pub fn register_partials(engine: &mut EngineHandle, partials: &PartialMap) -> Result<()> {
    for (id, filepath) in partials {
        let text = fs::read_to_string(filepath)
            .with_context(|| format!("failed to read partial `{filepath}`"))?;
        log!("partial"; "+ partial '{}'", id);
        engine.register_partial(id, &text)?;
    }
    Ok(())
}
