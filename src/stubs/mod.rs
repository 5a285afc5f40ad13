//! In-memory engines and engine source used by tests and the demo binary.

pub mod engines;
pub mod mappings;
pub mod source;

use std::{sync::Arc, time::Duration};

use crate::{
    adapters::default_registry,
    config::EngineConfig,
    constants::REQUIRE_EXPORT,
    core::{
        loader::EngineLoader,
        registry::AdapterRegistry,
        traits::engine::{EngineExport, EngineExports},
    },
};

use engines::{
    BabelStub, CallbackMode, CoffeeScriptStub, LessStub, LiveScriptRequire, SassStub, StylusStub,
    TypeScriptStub,
};
use source::EngineSourceStub;

/// Stub source publishing a fake engine at every configured locator.
pub fn stub_source(config: &EngineConfig, delay: Duration) -> EngineSourceStub {
    let stylus = config.stylus.export.clone();
    let sass = config.sass.export.clone();
    let less = config.less.export.clone();
    let typescript = config.typescript.export.clone();
    let babel = config.babel.export.clone();
    let coffeescript = config.coffeescript.export.clone();

    EngineSourceStub::new(delay)
        .with_engine(&config.stylus.locator, move || {
            EngineExports::new().with(&stylus, EngineExport::Renderer(Arc::new(StylusStub)))
        })
        .with_engine(&config.sass.locator, move || {
            EngineExports::new().with(
                &sass,
                EngineExport::Callback(Arc::new(SassStub::new(CallbackMode::Immediate))),
            )
        })
        .with_engine(&config.less.locator, move || {
            EngineExports::new().with(&less, EngineExport::AsyncRenderer(Arc::new(LessStub)))
        })
        .with_engine(&config.typescript.locator, move || {
            EngineExports::new().with(
                &typescript,
                EngineExport::Transpiler(Arc::new(TypeScriptStub)),
            )
        })
        .with_engine(&config.babel.locator, move || {
            EngineExports::new().with(&babel, EngineExport::Transformer(Arc::new(BabelStub)))
        })
        .with_engine(&config.livescript.locator, || {
            EngineExports::new().with(
                REQUIRE_EXPORT,
                EngineExport::Require(Arc::new(LiveScriptRequire)),
            )
        })
        .with_engine(&config.coffeescript.locator, move || {
            EngineExports::new().with(
                &coffeescript,
                EngineExport::Script(Arc::new(CoffeeScriptStub)),
            )
        })
}

/// Default registry wired to a [`stub_source`]. The source is returned as
/// well so callers can inspect activation counts.
pub fn stub_registry(
    config: &EngineConfig,
    delay: Duration,
) -> (Arc<EngineSourceStub>, AdapterRegistry) {
    let source = Arc::new(stub_source(config, delay));
    let loader = Arc::new(EngineLoader::new(source.clone()));
    (source, default_registry(loader, config))
}
