//! Owned handlebars registry for one plugin instance.
//!
//! The registry's helpers and partials are mutable state that changes every
//! refresh. Each [`TemplatePlugin`](crate::TemplatePlugin) owns exactly one
//! `EngineHandle`, and every hook and registry call receives it by reference,
//! so two plugin instances in one process never see each other's helpers.

use handlebars::{Handlebars, HelperDef, RenderError, Template, TemplateError};
use rustc_hash::FxHashSet;
use serde_json::Value;
use thiserror::Error;

/// Errors raised by the template engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("template syntax error")]
    Compile(#[from] TemplateError),

    #[error("render failed")]
    Render(#[from] RenderError),

    #[error("invalid helper script '{id}': {message}")]
    Script { id: String, message: String },

    #[error("invalid partial '{id}'")]
    Partial {
        id: String,
        #[source]
        source: TemplateError,
    },
}

/// Handlebars registry plus bookkeeping of what was registered through it.
pub struct EngineHandle {
    registry: Handlebars<'static>,
    helpers: FxHashSet<String>,
    partials: FxHashSet<String>,
}

impl Default for EngineHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("helpers", &self.helpers)
            .field("partials", &self.partials)
            .finish_non_exhaustive()
    }
}

impl EngineHandle {
    pub fn new() -> Self {
        Self {
            registry: Handlebars::new(),
            helpers: FxHashSet::default(),
            partials: FxHashSet::default(),
        }
    }

    /// Underlying registry, for hooks that need the full handlebars API.
    #[inline]
    pub fn registry(&self) -> &Handlebars<'static> {
        &self.registry
    }

    #[inline]
    pub fn registry_mut(&mut self) -> &mut Handlebars<'static> {
        &mut self.registry
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Whether a helper with this id is currently registered through the handle.
    #[inline]
    pub fn has_helper(&self, id: &str) -> bool {
        self.helpers.contains(id)
    }

    /// Register a native helper, replacing any previous one with the same id.
    pub fn register_helper(&mut self, id: &str, helper: Box<dyn HelperDef + Send + Sync>) {
        self.registry.register_helper(id, helper);
        self.helpers.insert(id.to_string());
    }

    /// Register a Rhai script helper from its source text.
    pub fn register_script_helper(&mut self, id: &str, script: &str) -> Result<(), EngineError> {
        self.registry
            .register_script_helper(id, script)
            .map_err(|e| EngineError::Script {
                id: id.to_string(),
                message: e.to_string(),
            })?;
        self.helpers.insert(id.to_string());
        Ok(())
    }

    /// Forget helper ids so the next registration is not reported as a duplicate.
    ///
    /// The registry keeps the old definition until it is overwritten.
    pub fn unregister_helpers<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            self.helpers.remove(id);
        }
    }

    // =========================================================================
    // Partials
    // =========================================================================

    #[inline]
    pub fn has_partial(&self, id: &str) -> bool {
        self.partials.contains(id)
    }

    /// Register partial source text under an id, replacing any previous body.
    pub fn register_partial(&mut self, id: &str, text: &str) -> Result<(), EngineError> {
        self.registry
            .register_partial(id, text)
            .map_err(|source| EngineError::Partial {
                id: id.to_string(),
                source,
            })?;
        self.partials.insert(id.to_string());
        Ok(())
    }

    // =========================================================================
    // Compile / Render
    // =========================================================================

    /// Compile template source into a render function.
    ///
    /// `name` (the entry's path) is carried into syntax and render errors.
    pub fn compile(&self, name: &str, source: &str) -> Result<Template, EngineError> {
        Ok(Template::compile_with_name(source, name.to_string())?)
    }

    /// Render a compiled template with data.
    ///
    /// The template is stored under `name` so that nested partial lookups and
    /// error messages refer to the entry it came from.
    pub fn render(
        &mut self,
        name: &str,
        template: Template,
        data: &Value,
    ) -> Result<String, EngineError> {
        self.registry.register_template(name, template);
        Ok(self.registry.render(name, data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handlebars::handlebars_helper;
    use serde_json::json;

    handlebars_helper!(shout: |s: str| s.to_uppercase());

    fn render_source(engine: &mut EngineHandle, source: &str, data: Value) -> String {
        let template = engine.compile("test", source).unwrap();
        engine.render("test", template, &data).unwrap()
    }

    #[test]
    fn test_native_helper() {
        let mut engine = EngineHandle::new();
        engine.register_helper("shout", Box::new(shout));

        assert!(engine.has_helper("shout"));
        assert_eq!(
            render_source(&mut engine, "{{shout name}}", json!({"name": "hi"})),
            "HI"
        );
    }

    #[test]
    fn test_script_helper() {
        let mut engine = EngineHandle::new();
        engine.register_script_helper("twice", "params[0] * 2").unwrap();

        assert!(engine.has_helper("twice"));
        assert_eq!(render_source(&mut engine, "{{twice 21}}", json!({})), "42");
    }

    #[test]
    fn test_unregister_forgets_helper() {
        let mut engine = EngineHandle::new();
        engine.register_helper("shout", Box::new(shout));
        engine.unregister_helpers(["shout"]);
        assert!(!engine.has_helper("shout"));
    }

    #[test]
    fn test_partial() {
        let mut engine = EngineHandle::new();
        engine.register_partial("partials/a", "<b>{{name}}</b>").unwrap();

        assert!(engine.has_partial("partials/a"));
        assert_eq!(
            render_source(&mut engine, "{{> partials/a}}", json!({"name": "x"})),
            "<b>x</b>"
        );
    }

    #[test]
    fn test_compile_error() {
        let engine = EngineHandle::new();
        assert!(matches!(
            engine.compile("test", "{{#if}}"),
            Err(EngineError::Compile(_))
        ));
    }

    #[test]
    fn test_render_error_on_missing_partial() {
        let mut engine = EngineHandle::new();
        let template = engine.compile("test", "{{> missing}}").unwrap();
        assert!(matches!(
            engine.render("test", template, &json!({})),
            Err(EngineError::Render(_))
        ));
    }

    #[test]
    fn test_render_error_names_template() {
        let mut engine = EngineHandle::new();
        let template = engine.compile("pages/about.hbs", "{{> missing}}").unwrap();
        let Err(EngineError::Render(err)) = engine.render("pages/about.hbs", template, &json!({}))
        else {
            panic!("expected render error");
        };
        assert!(err.to_string().contains("pages/about.hbs"), "{err}");
    }
}
