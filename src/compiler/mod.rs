//! Build cycle orchestration.
//!
//! One [`TemplatePlugin`] per configuration. The host calls
//! [`TemplatePlugin::compile`] in its build phase and
//! [`TemplatePlugin::emit`] in its emit phase:
//!
//! ```text
//! compile ─┬─ detector: tracked file changed? ── no ──→ SkippedNoChange
//!          └─ refresh (helpers → partials)
//!             └─ load data → glob entries
//!                └─ per entry, in sorted order:
//!                   read → before_compile → compile → before_render
//!                   → render → before_save → save → after_done
//! emit ──── dependencies + assets → Compilation
//! ```
//!
//! Entries are compiled sequentially because the engine's helper and partial
//! registry is shared per cycle. A failing entry is recorded in
//! `Compilation::errors` and the remaining entries still compile.

mod emit;
mod entry;
mod state;

pub use state::CycleState;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde_json::Value;

use crate::config::{LifecycleHooks, PluginConfig, PluginOptions};
use crate::deps::{ChangeDetector, DependencySet, select_detector};
use crate::engine::EngineHandle;
use crate::error::BuildError;
use crate::host::{Asset, Compilation, HostCapability};
use crate::registry::{
    HelperQuery, PartialIdGenerator, register_helpers, register_partials, resolve_helpers,
    resolve_partials,
};
use crate::{debug, log};

/// Incremental template compiler bound to one configuration.
pub struct TemplatePlugin {
    pub(crate) config: PluginConfig,
    helpers: IndexMap<String, HelperQuery>,
    partial_id: PartialIdGenerator,
    hooks: LifecycleHooks,
    pub(crate) engine: EngineHandle,
    dependencies: DependencySet,
    detector: Box<dyn ChangeDetector>,
    /// Output-relative path → asset.
    assets: IndexMap<String, Asset>,
    state: CycleState,
    /// Render data of the current cycle.
    data: Value,
}

impl std::fmt::Debug for TemplatePlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplatePlugin")
            .field("config", &self.config)
            .field("detector", &self.detector.name())
            .field("dependencies", &self.dependencies.len())
            .field("assets", &self.assets.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl TemplatePlugin {
    /// Build a plugin for a host that reports modified files.
    pub fn new(options: PluginOptions) -> Result<Self> {
        Self::with_capability(options, HostCapability::default())
    }

    /// Build a plugin, choosing change detection from the host capability.
    ///
    /// Validates the configuration and runs the before-setup hook.
    pub fn with_capability(mut options: PluginOptions, capability: HostCapability) -> Result<Self> {
        options.config.validate()?;

        let helpers = options.helper_queries();
        let PluginOptions {
            config,
            partial_id,
            hooks,
            ..
        } = options;

        let mut engine = EngineHandle::new();
        (hooks.before_setup)(&mut engine).context("before-setup hook failed")?;

        let detector = select_detector(capability);
        debug!("setup"; "change detection: {}", detector.name());

        Ok(Self {
            config,
            helpers,
            partial_id,
            hooks,
            engine,
            dependencies: DependencySet::new(),
            detector,
            assets: IndexMap::new(),
            state: CycleState::Idle,
            data: Value::Null,
        })
    }

    // =========================================================================
    // Build phase
    // =========================================================================

    /// Run one build cycle and return its terminal state.
    ///
    /// Never fails: problems are pushed into `compilation.errors`.
    pub fn compile(&mut self, compilation: &mut Compilation) -> CycleState {
        let failed_before = self.state == CycleState::Failed;
        self.advance(CycleState::CheckingDependencies);

        // Nothing tracked yet means nothing was compiled yet. A failed cycle
        // may not have tracked everything it needs, so it always retries.
        let changed = self.detector.has_changes(&self.dependencies, compilation);
        if !changed && !failed_before && !self.dependencies.is_empty() {
            self.advance(CycleState::SkippedNoChange);
            return self.state;
        }

        self.advance(CycleState::Refreshing);
        if let Err(cause) = self.refresh() {
            let error = BuildError::Setup(cause);
            log!("error"; "{}", error);
            compilation.errors.push(error);
            self.advance(CycleState::Failed);
            return self.state;
        }

        self.compile_all(compilation)
    }

    /// Resolve and register helpers, then partials.
    ///
    /// Files are tracked as soon as they are resolved, before they are read,
    /// so a broken helper or partial still triggers a rebuild once fixed.
    fn refresh(&mut self) -> Result<()> {
        let helpers = resolve_helpers(&self.helpers).context("failed to resolve helpers")?;
        self.dependencies
            .extend(helpers.iter().filter_map(|helper| helper.filepath()));
        register_helpers(&mut self.engine, &helpers).context("failed to register helpers")?;

        let mut partials = resolve_partials(&*self.partial_id, &self.config.partials)
            .context("failed to resolve partials")?;
        self.dependencies.extend(partials.values());
        (self.hooks.before_add_partials)(&mut self.engine, &mut partials)
            .context("before-add-partials hook failed")?;
        // The hook may have added partials of its own.
        self.dependencies.extend(partials.values());
        register_partials(&mut self.engine, &partials).context("failed to register partials")?;

        Ok(())
    }

    fn advance(&mut self, next: CycleState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "invalid cycle transition {} -> {}",
            self.state,
            next
        );
        debug!("cycle"; "{} -> {}", self.state, next);
        self.state = next;
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    #[inline]
    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    #[inline]
    pub fn engine_mut(&mut self) -> &mut EngineHandle {
        &mut self.engine
    }

    #[inline]
    pub fn dependencies(&self) -> &DependencySet {
        &self.dependencies
    }

    /// Track an extra file, e.g. one a hook read.
    pub fn add_dependency(&mut self, path: &str) -> bool {
        self.dependencies.add(path)
    }

    #[inline]
    pub fn assets(&self) -> &IndexMap<String, Asset> {
        &self.assets
    }

    #[inline]
    pub fn state(&self) -> CycleState {
        self.state
    }
}
