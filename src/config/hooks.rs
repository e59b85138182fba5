//! Lifecycle hooks.
//!
//! Every hook receives the plugin's [`EngineHandle`] first. Unset hooks are
//! identity or no-op closures, so the compiler calls them unconditionally.
//!
//! | Hook                  | When                                  | Returns         |
//! |-----------------------|---------------------------------------|-----------------|
//! | `before_setup`        | once, when the plugin is built        | `()`            |
//! | `before_add_partials` | every refresh, before registration    | `()`            |
//! | `before_compile`      | per entry, on the source text         | template text   |
//! | `before_render`       | per entry, on the render data         | render data     |
//! | `before_save`         | per entry, on the rendered text       | output text     |
//! | `after_done`          | per entry, after the output is saved  | `()`            |

use anyhow::Result;
use serde_json::Value;

use crate::engine::EngineHandle;
use crate::registry::PartialMap;

pub type SetupHook = Box<dyn Fn(&mut EngineHandle) -> Result<()>>;
pub type PartialsHook = Box<dyn Fn(&mut EngineHandle, &mut PartialMap) -> Result<()>>;
pub type CompileHook = Box<dyn Fn(&EngineHandle, String) -> Result<String>>;
/// Receives the data and the entry's source path.
pub type RenderHook = Box<dyn Fn(&EngineHandle, Value, &str) -> Result<Value>>;
/// Receives the rendered text and the target path.
pub type SaveHook = Box<dyn Fn(&EngineHandle, String, &str) -> Result<String>>;
/// Receives the target path.
pub type DoneHook = Box<dyn Fn(&EngineHandle, &str) -> Result<()>>;

pub struct LifecycleHooks {
    pub before_setup: SetupHook,
    pub before_add_partials: PartialsHook,
    pub before_compile: CompileHook,
    pub before_render: RenderHook,
    pub before_save: SaveHook,
    pub after_done: DoneHook,
}

impl Default for LifecycleHooks {
    fn default() -> Self {
        Self {
            before_setup: Box::new(|_| Ok(())),
            before_add_partials: Box::new(|_, _| Ok(())),
            before_compile: Box::new(|_, source| Ok(source)),
            before_render: Box::new(|_, data, _| Ok(data)),
            before_save: Box::new(|_, rendered, _| Ok(rendered)),
            after_done: Box::new(|_, _| Ok(())),
        }
    }
}

impl std::fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleHooks").finish_non_exhaustive()
    }
}
