//! Entry enumeration and the per-entry render pipeline.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::{CycleState, TemplatePlugin};
use crate::config::AssetRetention;
use crate::data::load_data;
use crate::error::BuildError;
use crate::host::Compilation;
use crate::resolve::{NAME_TOKEN, RootFolder, compute_target_path, infer_root_folder};
use crate::utils::path::absolute_slash_path;
use crate::{debug, log, scan};

impl TemplatePlugin {
    /// Load data, glob entries and compile each one.
    pub(super) fn compile_all(&mut self, compilation: &mut Compilation) -> CycleState {
        if self.config.assets == AssetRetention::Reset {
            self.assets.clear();
        }

        let data = load_data(self.config.data.as_ref());
        self.dependencies.extend(&data.files);
        self.data = data.value;

        self.advance(CycleState::Globbing);
        let entries = match scan::expand(&self.config.entry) {
            Ok(entries) => entries,
            Err(cause) => {
                let error = BuildError::Enumeration {
                    pattern: self.config.entry.clone(),
                    cause,
                };
                log!("error"; "{}", error);
                compilation.errors.push(error);
                self.advance(CycleState::Failed);
                return self.state;
            }
        };

        if entries.is_empty() {
            let message = format!("no entry files matched `{}`", self.config.entry);
            log!("warn"; "{}", message);
            compilation.warnings.push(message);
            self.advance(CycleState::Done {
                compiled: 0,
                failed: 0,
            });
            return self.state;
        }

        if entries.len() > 1
            && let Some(output) = &self.config.output
            && !output.contains(NAME_TOKEN)
        {
            let message = format!(
                "{} entries write to `{}`, add `{}` to the output template",
                entries.len(),
                output,
                NAME_TOKEN
            );
            log!("warn"; "{}", message);
            compilation.warnings.push(message);
        }

        self.advance(CycleState::CompilingEntries);
        let (mut compiled, mut failed) = (0, 0);
        for source in &entries {
            match self.compile_entry(source, compilation) {
                Ok(target) => {
                    debug!("entry"; "{} -> {}", source, target);
                    compiled += 1;
                }
                Err(error) => {
                    log!("error"; "{}", error);
                    compilation.errors.push(error);
                    failed += 1;
                }
            }
        }

        self.advance(CycleState::Done { compiled, failed });
        self.state
    }

    /// Compile one entry, returning its target path.
    fn compile_entry(
        &mut self,
        source: &str,
        compilation: &mut Compilation,
    ) -> Result<String, BuildError> {
        let root = match infer_root_folder(source, &self.config.entry, &self.config.partials) {
            RootFolder::Folder(root) => root,
            RootFolder::Ignored => {
                return Err(BuildError::Ignored {
                    path: source.to_string(),
                });
            }
        };

        self.render_entry(source, &root, compilation)
            .map_err(|cause| BuildError::Entry {
                path: source.to_string(),
                cause,
            })
    }

    fn render_entry(
        &mut self,
        source: &str,
        root: &str,
        compilation: &mut Compilation,
    ) -> Result<String> {
        let root = (!root.is_empty()).then_some(root);
        let target = compute_target_path(source, self.config.output.as_deref(), root);
        let target = absolute_slash_path(Path::new(&target));

        // Tracked before reading so a broken entry is rebuilt once fixed.
        self.dependencies.add(source);

        let text = fs::read_to_string(source).context("failed to read template")?;
        let text =
            (self.hooks.before_compile)(&self.engine, text).context("before-compile hook failed")?;
        let template = self
            .engine
            .compile(source, &text)
            .context("failed to compile template")?;

        let data = (self.hooks.before_render)(&self.engine, self.data.clone(), source)
            .context("before-render hook failed")?;
        let rendered = self
            .engine
            .render(source, template, &data)
            .context("failed to render template")?;

        let rendered = (self.hooks.before_save)(&self.engine, rendered, &target)
            .context("before-save hook failed")?;
        self.save(&target, rendered, compilation)?;

        (self.hooks.after_done)(&self.engine, &target).context("after-done hook failed")?;
        Ok(target)
    }
}
