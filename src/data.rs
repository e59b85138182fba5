//! External render data.
//!
//! Path sources are reloaded every cycle:
//!
//! ```text
//! data = "data/site.json"     → contents of site.json
//! data = "data/*.toml"        → { "nav": <nav.toml>, "site": <site.data.toml> }
//! ```
//!
//! A source that cannot be loaded degrades to the path string itself, so a
//! broken data file never stops the build.

use std::fs;

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

use crate::config::DataSource;
use crate::utils::path::{basename, strip_extension};
use crate::{log, scan};

/// Data for one cycle plus the files it was read from.
#[derive(Debug, Default)]
pub struct LoadedData {
    pub value: Value,
    pub files: Vec<String>,
}

/// Load render data. Never fails: errors are logged and fall back to the
/// raw path string.
///
/// `files` lists every file that was attempted, including on failure, so a
/// broken data file is still tracked and triggers a rebuild once fixed.
pub fn load_data(source: Option<&DataSource>) -> LoadedData {
    match source {
        None => LoadedData {
            value: Value::Object(Map::new()),
            files: Vec::new(),
        },
        Some(DataSource::Inline(value)) => LoadedData {
            value: value.clone(),
            files: Vec::new(),
        },
        Some(DataSource::Path(path)) => {
            let files = data_files(path);
            let value = load_files(path, &files).unwrap_or_else(|e| {
                log!("warn"; "failed to load data `{}`, using it as a string: {:#}", path, e);
                Value::String(path.clone())
            });
            LoadedData { value, files }
        }
    }
}

/// Files a data path refers to. A plain path is returned as is, even if it
/// does not exist yet.
fn data_files(path: &str) -> Vec<String> {
    if !scan::is_pattern(path) {
        return vec![path.to_string()];
    }
    scan::expand(path).unwrap_or_else(|e| {
        log!("warn"; "invalid data pattern `{}`: {:#}", path, e);
        Vec::new()
    })
}

fn load_files(path: &str, files: &[String]) -> Result<Value> {
    if !scan::is_pattern(path) {
        return parse_file(path);
    }

    let mut merged = Map::new();
    for file in files {
        let key = data_id(file);
        if merged.contains_key(&key) {
            bail!("duplicate data key '{key}' from `{file}`");
        }
        merged.insert(key, parse_file(file)?);
    }
    Ok(Value::Object(merged))
}

/// Parse one data file. `.toml` is read as TOML, everything else as JSON.
fn parse_file(path: &str) -> Result<Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read data `{path}`"))?;

    if path.ends_with(".toml") {
        let table: toml::Table =
            toml::from_str(&content).with_context(|| format!("invalid TOML in `{path}`"))?;
        serde_json::to_value(table).with_context(|| format!("unsupported value in `{path}`"))
    } else {
        serde_json::from_str(&content).with_context(|| format!("invalid JSON in `{path}`"))
    }
}

/// Key of a data file in the merged object: file stem without a `.data`
/// marker.
///
/// `/data/site.data.json` → `site`
pub fn data_id(path: &str) -> String {
    let stem = strip_extension(basename(path));
    stem.strip_suffix(".data").unwrap_or(stem).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::path::normalize_slashes;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(root: &TempDir, rel: &str, content: &str) -> String {
        let path = root.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        normalize_slashes(&path.to_string_lossy())
    }

    fn root(tmp: &TempDir) -> String {
        normalize_slashes(&tmp.path().to_string_lossy())
    }

    #[test]
    fn test_no_source_is_empty_object() {
        let data = load_data(None);
        assert_eq!(data.value, json!({}));
        assert!(data.files.is_empty());
    }

    #[test]
    fn test_inline() {
        let source = DataSource::Inline(json!({"title": "Hi"}));
        assert_eq!(load_data(Some(&source)).value, json!({"title": "Hi"}));
    }

    #[test]
    fn test_json_file() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "data.json", r#"{"title": "Hi"}"#);

        let data = load_data(Some(&DataSource::Path(path.clone())));
        assert_eq!(data.value, json!({"title": "Hi"}));
        assert_eq!(data.files, [path]);
    }

    #[test]
    fn test_toml_file() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "site.toml", "title = \"Hi\"\n[nav]\nhome = \"/\"");

        let data = load_data(Some(&DataSource::Path(path)));
        assert_eq!(data.value, json!({"title": "Hi", "nav": {"home": "/"}}));
    }

    #[test]
    fn test_parse_failure_falls_back_to_string() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "broken.json", "{ not json");

        let data = load_data(Some(&DataSource::Path(path.clone())));
        assert_eq!(data.value, Value::String(path.clone()));
        assert_eq!(data.files, [path]);
    }

    #[test]
    fn test_missing_file_falls_back_to_string() {
        let source = DataSource::Path("/does/not/exist.json".into());
        let data = load_data(Some(&source));
        assert_eq!(data.value, json!("/does/not/exist.json"));
        assert_eq!(data.files, ["/does/not/exist.json"]);
    }

    #[test]
    fn test_glob_merges_by_stem() {
        let tmp = TempDir::new().unwrap();
        write(&tmp, "data/nav.json", r#"["home"]"#);
        write(&tmp, "data/site.data.toml", "title = \"Hi\"");

        let data = load_data(Some(&DataSource::Path(format!("{}/data/*", root(&tmp)))));
        assert_eq!(data.value, json!({"nav": ["home"], "site": {"title": "Hi"}}));
        assert_eq!(data.files.len(), 2);
    }

    #[test]
    fn test_glob_duplicate_stem_falls_back() {
        let tmp = TempDir::new().unwrap();
        write(&tmp, "data/site.json", "{}");
        write(&tmp, "data/site.toml", "");
        let pattern = format!("{}/data/*", root(&tmp));

        let data = load_data(Some(&DataSource::Path(pattern.clone())));
        assert_eq!(data.value, Value::String(pattern));
        assert_eq!(data.files.len(), 2);
    }

    #[test]
    fn test_glob_with_broken_file_tracks_every_match() {
        let tmp = TempDir::new().unwrap();
        write(&tmp, "data/nav.json", r#"["home"]"#);
        write(&tmp, "data/site.json", "{ nope");
        let pattern = format!("{}/data/*.json", root(&tmp));

        let data = load_data(Some(&DataSource::Path(pattern.clone())));
        assert_eq!(data.value, Value::String(pattern));
        assert_eq!(data.files.len(), 2);
        assert!(data.files.iter().any(|f| f.ends_with("data/site.json")));
    }

    #[test]
    fn test_data_id() {
        assert_eq!(data_id("/data/site.json"), "site");
        assert_eq!(data_id("/data/site.data.json"), "site");
        assert_eq!(data_id("C:/data/metadata.toml"), "metadata");
    }
}
