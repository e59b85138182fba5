//! Output handling: in-memory assets, direct writes, emit phase.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::TemplatePlugin;
use crate::host::{Asset, Compilation};
use crate::log;
use crate::utils::path::absolute_slash_path;

impl TemplatePlugin {
    /// Store rendered output.
    ///
    /// Targets inside the host's output directory become assets keyed by
    /// their relative path. Anything else is written straight to disk and is
    /// not served by the host.
    pub(super) fn save(
        &mut self,
        target: &str,
        content: String,
        compilation: &Compilation,
    ) -> Result<()> {
        if let Some(relative) = output_relative(target, &compilation.output_path) {
            log!("emit"; "{}", relative);
            self.assets.insert(relative.to_string(), Asset::new(content));
            return Ok(());
        }

        if let Some(parent) = Path::new(target).parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create `{}`", parent.display()))?;
        }
        fs::write(target, content).with_context(|| format!("failed to write `{target}`"))?;
        log!("write"; "{}", target);
        Ok(())
    }

    // =========================================================================
    // Emit phase
    // =========================================================================

    /// Hand tracked files and generated assets to the host.
    pub fn emit(&self, compilation: &mut Compilation) {
        compilation
            .file_dependencies
            .extend(self.dependencies.iter().cloned());
        compilation.assets.extend(
            self.assets
                .iter()
                .map(|(path, asset)| (path.clone(), asset.clone())),
        );
    }

    /// Drop all generated assets and tracked files.
    ///
    /// The next cycle compiles unconditionally.
    pub fn reset_assets(&mut self) {
        self.assets.clear();
        self.dependencies.clear();
    }
}

/// `target` relative to `output_dir`, if it lies below it.
fn output_relative<'a>(target: &'a str, output_dir: &Path) -> Option<&'a str> {
    if output_dir.as_os_str().is_empty() {
        return None;
    }
    let root = absolute_slash_path(output_dir);
    target
        .strip_prefix(root.trim_end_matches('/'))
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|relative| !relative.is_empty())
}
