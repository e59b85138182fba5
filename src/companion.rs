//! HTML companion pages.
//!
//! A companion HTML generator can hand its rendered pages to the plugin.
//! Each page becomes a partial, so templates can embed it:
//!
//! ```text
//! output_name "pages/about.html", prefix "html" → {{> html/pages/about}}
//! ```

use anyhow::Result;

use crate::TemplatePlugin;
use crate::log;
use crate::utils::path::{normalize_slashes, strip_extension};

/// A page produced by the companion generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionPage {
    /// Output file name relative to the output directory.
    pub output_name: String,
    /// Template the page was generated from. Tracked as a dependency.
    pub template_path: String,
    pub html: String,
}

/// Partial id of a companion page.
pub fn companion_partial_id(prefix: &str, output_name: &str) -> String {
    let name = normalize_slashes(output_name);
    let name = name.trim_start_matches("./").trim_start_matches('/');
    format!("{}/{}", prefix.trim_end_matches('/'), strip_extension(name))
}

impl TemplatePlugin {
    /// Register a companion page as a partial.
    ///
    /// Returns the partial id, or `None` when the integration is disabled.
    pub fn register_companion_page(&mut self, page: &CompanionPage) -> Result<Option<String>> {
        let companion = &self.config.html_companion;
        if !companion.enabled {
            return Ok(None);
        }

        let id = companion_partial_id(&companion.prefix, &page.output_name);
        self.engine.register_partial(&id, &page.html)?;
        self.add_dependency(&page.template_path);
        log!("partial"; "+ companion '{}'", id);
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_companion_partial_id() {
        assert_eq!(companion_partial_id("html", "index.html"), "html/index");
        assert_eq!(companion_partial_id("html", "./pages/about.html"), "html/pages/about");
        assert_eq!(companion_partial_id("pages/", r"\nested\a.html"), "pages/nested/a");
    }
}
