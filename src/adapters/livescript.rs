use std::sync::Arc;

use crate::{
    config::EngineEntry,
    constants::{LIVESCRIPT_MODULE, REQUIRE_EXPORT},
    core::{
        domain::{CompileResult, Locator, SourceFile},
        errors::CompileError,
        traits::{
            adapter::{EngineSet, LanguageAdapter},
            engine::{EngineExport, MapMode, ScriptCompiler, ScriptOptions},
        },
    },
};

#[derive(Debug, Clone)]
pub struct LiveScriptAdapter {
    engine: EngineEntry,
}

impl LiveScriptAdapter {
    pub fn new(engine: EngineEntry) -> Self {
        Self { engine }
    }

    /// The browser bundle may only publish `require`; the compiler is then
    /// obtained as the `livescript` module.
    fn resolve(&self, engines: &EngineSet) -> Result<Arc<dyn ScriptCompiler>, CompileError> {
        let locator = &self.engine.locator;
        if let Ok(compiler) = engines.script(locator, &self.engine.export) {
            return Ok(compiler);
        }

        let required = match engines.export(locator, REQUIRE_EXPORT) {
            Ok(EngineExport::Require(require)) => require.require(LIVESCRIPT_MODULE),
            _ => None,
        };
        match required {
            Some(EngineExport::Script(compiler)) => Ok(compiler),
            _ => Err(CompileError::MissingExport {
                locator: locator.clone(),
                symbol: self.engine.export.clone(),
            }),
        }
    }
}

#[async_trait::async_trait]
impl LanguageAdapter for LiveScriptAdapter {
    fn tag(&self) -> &str {
        "ls"
    }

    fn locators(&self) -> Vec<Locator> {
        vec![self.engine.locator.clone()]
    }

    #[tracing::instrument(skip(self, engines))]
    async fn compile(
        &self,
        engines: &EngineSet,
        file: &SourceFile,
    ) -> Result<CompileResult, CompileError> {
        let livescript = self.resolve(engines)?;
        let options = ScriptOptions {
            filename: file.name.clone(),
            map: MapMode::Linked,
        };

        let output = livescript.compile(&file.content, &options)?;

        Ok(CompileResult::with_source_map(output.code, output.source_map))
    }
}
