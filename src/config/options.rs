//! Builder combining [`PluginConfig`] with the parts that are code.

use anyhow::Result;
use handlebars::HelperDef;
use indexmap::IndexMap;
use serde_json::Value;

use super::{LifecycleHooks, PluginConfig};
use crate::engine::EngineHandle;
use crate::registry::{HelperQuery, PartialIdGenerator, PartialMap, default_partial_id};

/// Everything needed to build a [`TemplatePlugin`](crate::TemplatePlugin).
///
/// ```ignore
/// let options = PluginOptions::new(PluginConfig::from_path(path)?)
///     .helper("shout", shout)
///     .before_render(|_, mut data, source| {
///         data["source"] = source.into();
///         Ok(data)
///     });
/// ```
pub struct PluginOptions {
    pub config: PluginConfig,
    pub(crate) inline_helpers: IndexMap<String, HelperQuery>,
    pub(crate) partial_id: PartialIdGenerator,
    pub(crate) hooks: LifecycleHooks,
}

impl From<PluginConfig> for PluginOptions {
    fn from(config: PluginConfig) -> Self {
        Self::new(config)
    }
}

impl PluginOptions {
    pub fn new(config: PluginConfig) -> Self {
        Self {
            config,
            inline_helpers: IndexMap::new(),
            partial_id: Box::new(default_partial_id),
            hooks: LifecycleHooks::default(),
        }
    }

    /// Add a native helper. It is cloned into the engine on every refresh.
    pub fn helper<H>(self, id: impl Into<String>, helper: H) -> Self
    where
        H: HelperDef + Clone + Send + Sync + 'static,
    {
        self.helper_factory(id, move || Box::new(helper.clone()))
    }

    /// Add a native helper built by `factory` on every refresh.
    pub fn helper_factory<F>(mut self, id: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn HelperDef + Send + Sync> + 'static,
    {
        self.inline_helpers
            .insert(id.into(), HelperQuery::Inline(Box::new(factory)));
        self
    }

    /// Replace the default partial id generator.
    pub fn partial_id<F>(mut self, generator: F) -> Self
    where
        F: Fn(&str) -> String + 'static,
    {
        self.partial_id = Box::new(generator);
        self
    }

    pub fn hooks(mut self, hooks: LifecycleHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn before_setup<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut EngineHandle) -> Result<()> + 'static,
    {
        self.hooks.before_setup = Box::new(hook);
        self
    }

    pub fn before_add_partials<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut EngineHandle, &mut PartialMap) -> Result<()> + 'static,
    {
        self.hooks.before_add_partials = Box::new(hook);
        self
    }

    pub fn before_compile<F>(mut self, hook: F) -> Self
    where
        F: Fn(&EngineHandle, String) -> Result<String> + 'static,
    {
        self.hooks.before_compile = Box::new(hook);
        self
    }

    pub fn before_render<F>(mut self, hook: F) -> Self
    where
        F: Fn(&EngineHandle, Value, &str) -> Result<Value> + 'static,
    {
        self.hooks.before_render = Box::new(hook);
        self
    }

    pub fn before_save<F>(mut self, hook: F) -> Self
    where
        F: Fn(&EngineHandle, String, &str) -> Result<String> + 'static,
    {
        self.hooks.before_save = Box::new(hook);
        self
    }

    pub fn after_done<F>(mut self, hook: F) -> Self
    where
        F: Fn(&EngineHandle, &str) -> Result<()> + 'static,
    {
        self.hooks.after_done = Box::new(hook);
        self
    }

    /// Helper queries in registration order: configured globs, then inline
    /// helpers. An inline helper replaces a glob query with the same key.
    pub(crate) fn helper_queries(&mut self) -> IndexMap<String, HelperQuery> {
        let mut queries: IndexMap<String, HelperQuery> = self
            .config
            .helpers
            .iter()
            .map(|(id, pattern)| (id.clone(), HelperQuery::Glob(pattern.clone())))
            .collect();
        for (id, query) in self.inline_helpers.drain(..) {
            queries.insert(id, query);
        }
        queries
    }
}

impl std::fmt::Debug for PluginOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginOptions")
            .field("config", &self.config)
            .field("inline_helpers", &self.inline_helpers.keys())
            .finish_non_exhaustive()
    }
}
