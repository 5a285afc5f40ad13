//! Built-in language adapters.
//!
//! Each adapter knows which engines it needs, which symbols they export,
//! and how to turn the native result into a [`CompileResult`].
//!
//! [`CompileResult`]: crate::core::domain::CompileResult

pub mod babel;
pub mod chain;
pub mod less;
pub mod livescript;
pub mod sass;
pub mod stylus;
pub mod typescript;

use std::sync::Arc;

use crate::{
    config::EngineConfig,
    core::{loader::EngineLoader, registry::AdapterRegistry},
};

pub use babel::BabelAdapter;
pub use chain::{ChainedAdapter, Intermediate};
pub use less::LessAdapter;
pub use livescript::LiveScriptAdapter;
pub use sass::SassAdapter;
pub use stylus::StylusAdapter;
pub use typescript::TypeScriptAdapter;

/// Create a registry with every built-in adapter.
pub fn default_registry(loader: Arc<EngineLoader>, config: &EngineConfig) -> AdapterRegistry {
    let mut registry = AdapterRegistry::new(loader);
    registry.register(StylusAdapter::new(config.stylus.clone()));
    registry.register(SassAdapter::scss(config.sass.clone()));
    registry.register(SassAdapter::sass(config.sass.clone()));
    registry.register(LessAdapter::new(config.less.clone()));
    registry.register(TypeScriptAdapter::new(config.typescript.clone()));
    registry.register(BabelAdapter::new(config.babel.clone()));
    registry.register(LiveScriptAdapter::new(config.livescript.clone()));
    registry.register(ChainedAdapter::coffee(
        config.coffeescript.clone(),
        config.babel.clone(),
    ));
    registry
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::{
        config::EngineEntry,
        core::traits::{
            adapter::EngineSet,
            engine::{EngineExport, EngineExports},
        },
    };

    pub fn engines(entries: Vec<(&EngineEntry, EngineExport)>) -> EngineSet {
        let mut engines = EngineSet::new();
        for (entry, export) in entries {
            engines.insert(
                entry.locator.clone(),
                Arc::new(EngineExports::new().with(&entry.export, export)),
            );
        }
        engines
    }
}
