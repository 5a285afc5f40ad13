use std::collections::HashMap;
use std::sync::Arc;

use crate::core::{
    domain::{CompileResult, Locator, SourceFile},
    errors::CompileError,
    traits::engine::{
        AsyncRenderer, CallbackCompiler, EngineExport, EngineExports, Renderer, ScriptCompiler,
        Transformer, Transpiler,
    },
};

/// Normalizes one engine's native API into the uniform compile contract.
///
/// Adapters hold no engine state. The registry loads every locator returned
/// by [`LanguageAdapter::locators`] before calling
/// [`LanguageAdapter::compile`].
#[async_trait::async_trait]
pub trait LanguageAdapter: Send + Sync {
    fn tag(&self) -> &str;

    fn locators(&self) -> Vec<Locator>;

    async fn compile(
        &self,
        engines: &EngineSet,
        file: &SourceFile,
    ) -> Result<CompileResult, CompileError>;
}

/// Exports of every engine an adapter asked for, after they all loaded.
#[derive(Clone, Debug, Default)]
pub struct EngineSet {
    engines: HashMap<Locator, Arc<EngineExports>>,
}

impl EngineSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, locator: Locator, exports: Arc<EngineExports>) {
        self.engines.insert(locator, exports);
    }

    pub fn export(&self, locator: &Locator, symbol: &str) -> Result<&EngineExport, CompileError> {
        self.engines
            .get(locator)
            .and_then(|exports| exports.get(symbol))
            .ok_or_else(|| missing(locator, symbol))
    }

    pub fn renderer(&self, locator: &Locator, symbol: &str) -> Result<Arc<dyn Renderer>, CompileError> {
        match self.export(locator, symbol)? {
            EngineExport::Renderer(engine) => Ok(engine.clone()),
            _ => Err(missing(locator, symbol)),
        }
    }

    pub fn callback(
        &self,
        locator: &Locator,
        symbol: &str,
    ) -> Result<Arc<dyn CallbackCompiler>, CompileError> {
        match self.export(locator, symbol)? {
            EngineExport::Callback(engine) => Ok(engine.clone()),
            _ => Err(missing(locator, symbol)),
        }
    }

    pub fn async_renderer(
        &self,
        locator: &Locator,
        symbol: &str,
    ) -> Result<Arc<dyn AsyncRenderer>, CompileError> {
        match self.export(locator, symbol)? {
            EngineExport::AsyncRenderer(engine) => Ok(engine.clone()),
            _ => Err(missing(locator, symbol)),
        }
    }

    pub fn transpiler(
        &self,
        locator: &Locator,
        symbol: &str,
    ) -> Result<Arc<dyn Transpiler>, CompileError> {
        match self.export(locator, symbol)? {
            EngineExport::Transpiler(engine) => Ok(engine.clone()),
            _ => Err(missing(locator, symbol)),
        }
    }

    pub fn transformer(
        &self,
        locator: &Locator,
        symbol: &str,
    ) -> Result<Arc<dyn Transformer>, CompileError> {
        match self.export(locator, symbol)? {
            EngineExport::Transformer(engine) => Ok(engine.clone()),
            _ => Err(missing(locator, symbol)),
        }
    }

    pub fn script(
        &self,
        locator: &Locator,
        symbol: &str,
    ) -> Result<Arc<dyn ScriptCompiler>, CompileError> {
        match self.export(locator, symbol)? {
            EngineExport::Script(engine) => Ok(engine.clone()),
            _ => Err(missing(locator, symbol)),
        }
    }
}

fn missing(locator: &Locator, symbol: &str) -> CompileError {
    CompileError::MissingExport {
        locator: locator.clone(),
        symbol: symbol.to_string(),
    }
}
