//! Helper resolution and registration.
//!
//! A helper query is either an inline native helper or a glob pattern
//! selecting Rhai script files:
//!
//! ```text
//! helpers/a.helper.rhai         → id "a"
//! helpers/nested/b.helper.rhai  → id "b"
//! helpers/helper.format.rhai    → id "format"
//! ```

use std::fs;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use handlebars::HelperDef;
use indexmap::IndexMap;
use regex::Regex;

use crate::engine::EngineHandle;
use crate::utils::path::{basename, strip_extension};
use crate::{log, scan};

/// Marker segment stripped from helper file names.
static HELPER_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.?helper\.?").expect("helper marker regex"));

/// Builds a fresh native helper instance for each registration.
pub type HelperFactory = Box<dyn Fn() -> Box<dyn HelperDef + Send + Sync>>;

/// One configured helper source.
pub enum HelperQuery {
    /// Native helper registered under the query's key.
    Inline(HelperFactory),
    /// Glob pattern of script files, one helper per match.
    Glob(String),
}

impl std::fmt::Debug for HelperQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inline(_) => f.write_str("Inline(..)"),
            Self::Glob(pattern) => f.debug_tuple("Glob").field(pattern).finish(),
        }
    }
}

/// What a resolved helper registers.
pub enum HelperBody<'a> {
    Inline(&'a HelperFactory),
    /// Normalized path of a script file, read when the helper is registered.
    Script(String),
}

/// A resolved helper.
pub struct HelperEntry<'a> {
    pub id: String,
    pub body: HelperBody<'a>,
}

impl HelperEntry<'_> {
    /// Source file, `None` for inline helpers.
    pub fn filepath(&self) -> Option<&str> {
        match &self.body {
            HelperBody::Inline(_) => None,
            HelperBody::Script(path) => Some(path.as_str()),
        }
    }
}

impl std::fmt::Debug for HelperEntry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HelperEntry")
            .field("id", &self.id)
            .field("filepath", &self.filepath())
            .finish_non_exhaustive()
    }
}

/// Derive a helper id from its file name.
///
/// The extension is removed, then the first `helper` marker together with
/// its adjoining dot.
pub fn helper_id(filepath: &str) -> String {
    let stem = strip_extension(basename(filepath));
    HELPER_MARKER.replace(stem, "").into_owned()
}

/// Resolve helper queries into concrete entries.
///
/// Only globs are expanded here. Script files are read by
/// [`register_helpers`], fresh on every call, so edits between build cycles
/// are picked up without restarting.
pub fn resolve_helpers(queries: &IndexMap<String, HelperQuery>) -> Result<Vec<HelperEntry<'_>>> {
    let mut resolved = Vec::new();

    for (key, query) in queries {
        match query {
            HelperQuery::Inline(factory) => resolved.push(HelperEntry {
                id: key.clone(),
                body: HelperBody::Inline(factory),
            }),
            HelperQuery::Glob(pattern) => {
                for filepath in scan::expand(pattern)? {
                    resolved.push(HelperEntry {
                        id: helper_id(&filepath),
                        body: HelperBody::Script(filepath),
                    });
                }
            }
        }
    }

    Ok(resolved)
}

/// Register resolved helpers, returning the number of duplicate ids.
///
/// Ids from a previous refresh are forgotten first, so re-registering the
/// same set each cycle is silent. A duplicate within one resolution logs a
/// warning and the later entry wins.
pub fn register_helpers(engine: &mut EngineHandle, entries: &[HelperEntry<'_>]) -> Result<usize> {
    engine.unregister_helpers(entries.iter().map(|entry| entry.id.as_str()));

    let mut duplicates = 0;
    for entry in entries {
        if engine.has_helper(&entry.id) {
            duplicates += 1;
            log!(
                "warn";
                "the helper '{}' is already registered, remove duplications to prevent hard to find errors",
                entry.id
            );
        } else {
            log!("helper"; "+ helper '{}'", entry.id);
        }

        match &entry.body {
            HelperBody::Inline(factory) => engine.register_helper(&entry.id, factory()),
            HelperBody::Script(filepath) => {
                let script = fs::read_to_string(filepath)
                    .with_context(|| format!("failed to read helper `{filepath}`"))?;
                engine.register_script_helper(&entry.id, &script)?;
            }
        }
    }

    Ok(duplicates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::path::normalize_slashes;
    use handlebars::handlebars_helper;
    use serde_json::json;
    use tempfile::TempDir;

    handlebars_helper!(random: |_x: i64| 4);

    fn write(root: &TempDir, rel: &str, content: &str) -> String {
        let path = root.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        normalize_slashes(&path.to_string_lossy())
    }

    fn helper_tree() -> TempDir {
        let tmp = TempDir::new().unwrap();
        write(&tmp, "helpers/a.helper.rhai", "\"a\"");
        write(&tmp, "helpers/b.helper.rhai", "\"b\"");
        write(&tmp, "helpers/nested/a-nested.helper.rhai", "\"a-nested\"");
        tmp
    }

    fn glob_query(root: &TempDir, rel: &str) -> IndexMap<String, HelperQuery> {
        let pattern = format!("{}/{}", normalize_slashes(&root.path().to_string_lossy()), rel);
        IndexMap::from([("fromGlob".to_string(), HelperQuery::Glob(pattern))])
    }

    #[test]
    fn test_helper_id() {
        assert_eq!(helper_id("/src/helpers/a.helper.rhai"), "a");
        assert_eq!(helper_id("/src/helpers/nested/a-nested.helper.rhai"), "a-nested");
        assert_eq!(helper_id("/src/helpers/helper.format.rhai"), "format");
        assert_eq!(helper_id("/src/helpers/plain.rhai"), "plain");
    }

    #[test]
    fn test_resolve_empty() {
        assert!(resolve_helpers(&IndexMap::new()).unwrap().is_empty());
    }

    #[test]
    fn test_resolve_inline() {
        let queries = IndexMap::from([(
            "random".to_string(),
            HelperQuery::Inline(Box::new(|| -> Box<dyn HelperDef + Send + Sync> {
                Box::new(random)
            })),
        )]);

        let resolved = resolve_helpers(&queries).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, "random");
        assert!(resolved[0].filepath().is_none());
        assert!(matches!(resolved[0].body, HelperBody::Inline(_)));
    }

    #[test]
    fn test_resolve_single_file() {
        let tmp = helper_tree();
        let queries = glob_query(&tmp, "helpers/a.helper.rhai");
        let resolved = resolve_helpers(&queries).unwrap();

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, "a");
        assert!(resolved[0].filepath().unwrap().ends_with("helpers/a.helper.rhai"));
    }

    #[test]
    fn test_resolve_folder() {
        let tmp = helper_tree();
        let queries = glob_query(&tmp, "helpers/*.rhai");
        let resolved = resolve_helpers(&queries).unwrap();

        let ids: Vec<_> = resolved.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn test_resolve_nested() {
        let tmp = helper_tree();
        let queries = glob_query(&tmp, "helpers/**/*.rhai");
        let resolved = resolve_helpers(&queries).unwrap();

        let ids: Vec<_> = resolved.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "a-nested"]);
    }

    #[test]
    fn test_register_rereads_changed_script() {
        let tmp = helper_tree();
        let queries = glob_query(&tmp, "helpers/a.helper.rhai");
        let mut engine = EngineHandle::new();

        let first = resolve_helpers(&queries).unwrap();
        register_helpers(&mut engine, &first).unwrap();

        write(&tmp, "helpers/a.helper.rhai", "\"changed\"");
        let second = resolve_helpers(&queries).unwrap();
        register_helpers(&mut engine, &second).unwrap();

        let template = engine.compile("t", "{{a}}").unwrap();
        assert_eq!(engine.render("t", template, &json!({})).unwrap(), "changed");
    }

    #[test]
    fn test_resolve_does_not_read_scripts() {
        let tmp = helper_tree();
        write(&tmp, "helpers/broken.helper.rhai", "\"unterminated");
        let queries = glob_query(&tmp, "helpers/*.rhai");

        let resolved = resolve_helpers(&queries).unwrap();
        assert_eq!(resolved.len(), 3);

        let mut engine = EngineHandle::new();
        assert!(register_helpers(&mut engine, &resolved).is_err());
    }

    #[test]
    fn test_register_and_render() {
        let tmp = helper_tree();
        let queries = glob_query(&tmp, "helpers/**/*.rhai");
        let mut engine = EngineHandle::new();

        let resolved = resolve_helpers(&queries).unwrap();
        assert_eq!(register_helpers(&mut engine, &resolved).unwrap(), 0);

        let template = engine.compile("t", "{{a}}-{{b}}-{{a-nested}}").unwrap();
        let out = engine.render("t", template, &json!({})).unwrap();
        assert_eq!(out, "a-b-a-nested");
    }

    #[test]
    fn test_reregister_across_refresh_is_not_duplicate() {
        let tmp = helper_tree();
        let queries = glob_query(&tmp, "helpers/*.rhai");
        let mut engine = EngineHandle::new();

        let first = resolve_helpers(&queries).unwrap();
        register_helpers(&mut engine, &first).unwrap();
        let second = resolve_helpers(&queries).unwrap();
        assert_eq!(register_helpers(&mut engine, &second).unwrap(), 0);
    }

    #[test]
    fn test_duplicate_in_one_resolution_warns_and_last_wins() {
        let tmp = TempDir::new().unwrap();
        write(&tmp, "one/a.helper.rhai", "\"first\"");
        write(&tmp, "two/a.helper.rhai", "\"second\"");
        let queries = glob_query(&tmp, "*/a.helper.rhai");
        let mut engine = EngineHandle::new();

        let resolved = resolve_helpers(&queries).unwrap();
        assert_eq!(register_helpers(&mut engine, &resolved).unwrap(), 1);

        let template = engine.compile("t", "{{a}}").unwrap();
        assert_eq!(engine.render("t", template, &json!({})).unwrap(), "second");
    }
}
