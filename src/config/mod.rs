//! Plugin configuration.
//!
//! The serializable part lives in [`PluginConfig`] and can be loaded from a
//! TOML file:
//!
//! ```toml
//! entry = "src/pages/**/*.hbs"
//! output = "dist/[path]/[name].html"
//! data = "src/data/*.json"
//! partials = ["src/partials/**/*.hbs"]
//! assets = "reset"
//! html_companion = { enabled = true, prefix = "html" }
//!
//! [helpers]
//! scripts = "src/helpers/*.helper.rhai"
//! ```
//!
//! Inline helpers, the partial id generator and lifecycle hooks are code, so
//! they are attached through [`PluginOptions`].

mod error;
mod hooks;
mod options;

pub use error::{ConfigDiagnostic, ConfigDiagnostics, ConfigError};
pub use hooks::LifecycleHooks;
pub use options::PluginOptions;

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::log;
use crate::utils::path::normalize_slashes;

// ============================================================================
// Sections
// ============================================================================

/// External render data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataSource {
    /// Path or glob of JSON/TOML files, reloaded every cycle.
    Path(String),
    /// Value used as-is.
    Inline(Value),
}

/// HTML companion integration.
///
/// Accepts `html_companion = true` as well as a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CompanionToggle")]
pub struct HtmlCompanionConfig {
    pub enabled: bool,
    /// Partial id prefix for companion pages.
    pub prefix: String,
}

impl Default for HtmlCompanionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            prefix: "html".into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CompanionToggle {
    Flag(bool),
    Table {
        #[serde(default = "enabled_by_default")]
        enabled: bool,
        #[serde(default)]
        prefix: Option<String>,
    },
}

fn enabled_by_default() -> bool {
    true
}

impl From<CompanionToggle> for HtmlCompanionConfig {
    fn from(toggle: CompanionToggle) -> Self {
        match toggle {
            CompanionToggle::Flag(enabled) => Self {
                enabled,
                ..Self::default()
            },
            CompanionToggle::Table { enabled, prefix } => Self {
                enabled,
                prefix: prefix.unwrap_or_else(|| Self::default().prefix),
            },
        }
    }
}

/// What happens to the asset map when a new cycle compiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetRetention {
    /// Start every cycle with an empty map so renamed outputs do not linger.
    #[default]
    Reset,
    /// Keep assets from earlier cycles and overwrite changed ones.
    Accumulate,
}

// ============================================================================
// PluginConfig
// ============================================================================

/// Serializable plugin configuration, frozen once the plugin is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Glob selecting template entries.
    pub entry: String,
    /// Output path template, may contain `[name]` and `[path]`.
    pub output: Option<String>,
    pub data: Option<DataSource>,
    /// Helper id → glob of script files.
    pub helpers: IndexMap<String, String>,
    /// Partial globs.
    pub partials: Vec<String>,
    pub html_companion: HtmlCompanionConfig,
    pub assets: AssetRetention,
}

impl PluginConfig {
    /// Config with just an entry pattern.
    pub fn new(entry: impl Into<String>) -> Self {
        Self {
            entry: entry.into(),
            ..Self::default()
        }
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from a file.
    ///
    /// Relative paths are anchored at the file's directory and unknown
    /// fields are reported as warnings.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (mut config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            log!("warn"; "unknown fields in {}: {}", path.display(), ignored.join(", "));
        }

        let root = path
            .parent()
            .map(|dir| normalize_slashes(&dir.to_string_lossy()))
            .unwrap_or_default();
        config.anchor_at(&root);
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Rewrite every relative path and pattern to start at `root`.
    fn anchor_at(&mut self, root: &str) {
        if root.is_empty() {
            return;
        }
        self.entry = anchor(root, &self.entry);
        if let Some(output) = &mut self.output {
            *output = anchor(root, output);
        }
        if let Some(DataSource::Path(data)) = &mut self.data {
            *data = anchor(root, data);
        }
        for pattern in self.helpers.values_mut().chain(self.partials.iter_mut()) {
            *pattern = anchor(root, pattern);
        }
    }

    /// Validate configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        if self.entry.trim().is_empty() {
            diag.error_with_hint(
                "entry",
                "entry pattern is required",
                "set `entry = \"src/**/*.hbs\"`",
            );
        }
        if let Some(output) = &self.output
            && output.trim().is_empty()
        {
            diag.error("output", "output template is empty");
        }
        if let Some(DataSource::Path(data)) = &self.data
            && data.trim().is_empty()
        {
            diag.error("data", "data path is empty");
        }
        for (id, pattern) in &self.helpers {
            if pattern.trim().is_empty() {
                diag.error(format!("helpers.{id}"), "helper pattern is empty");
            }
        }
        for (i, pattern) in self.partials.iter().enumerate() {
            if pattern.trim().is_empty() {
                diag.error(format!("partials[{i}]"), "partial pattern is empty");
            }
        }
        if self.html_companion.enabled && self.html_companion.prefix.trim().is_empty() {
            diag.error_with_hint(
                "html_companion.prefix",
                "prefix is empty",
                "remove the field to use the default `html`",
            );
        }

        diag.into_result()
    }
}

fn anchor(root: &str, path: &str) -> String {
    let path = normalize_slashes(path);
    if Path::new(&path).is_absolute() || path.starts_with('/') {
        return path;
    }
    let relative = path.strip_prefix("./").unwrap_or(&path);
    format!("{}/{}", root.trim_end_matches('/'), relative)
}
