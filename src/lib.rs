//! stencil - incremental handlebars template compiler for bundler pipelines.
//!
//! Entry templates are selected by glob, rendered with helpers, partials and
//! external data, and handed to the host build system as in-memory assets.
//! Every file read along the way is tracked, so a build cycle in which no
//! tracked file changed is skipped.
//!
//! ```ignore
//! let config = PluginConfig::from_path(Path::new("stencil.toml"))?;
//! let mut plugin = TemplatePlugin::new(PluginOptions::new(config))?;
//!
//! // build phase
//! let mut compilation = Compilation::new("dist").with_modified_files(changed);
//! plugin.compile(&mut compilation);
//!
//! // emit phase
//! plugin.emit(&mut compilation);
//! ```

pub mod logger;

pub mod companion;
pub mod compiler;
pub mod config;
pub mod data;
pub mod deps;
pub mod engine;
pub mod error;
pub mod host;
pub mod registry;
pub mod resolve;
pub mod scan;
pub mod utils;

pub use companion::{CompanionPage, companion_partial_id};
pub use compiler::{CycleState, TemplatePlugin};
pub use config::{
    AssetRetention, ConfigError, DataSource, HtmlCompanionConfig, LifecycleHooks, PluginConfig,
    PluginOptions,
};
pub use deps::{ChangeDetector, DependencySet};
pub use engine::{EngineError, EngineHandle};
pub use error::BuildError;
pub use host::{Asset, Compilation, HostCapability};
pub use registry::PartialMap;
