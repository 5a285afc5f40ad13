use crate::{
    config::EngineEntry,
    core::{
        domain::{CompileResult, Locator, SourceFile},
        errors::CompileError,
        traits::adapter::{EngineSet, LanguageAdapter},
    },
};

#[derive(Debug, Clone)]
pub struct StylusAdapter {
    engine: EngineEntry,
}

impl StylusAdapter {
    pub fn new(engine: EngineEntry) -> Self {
        Self { engine }
    }
}

#[async_trait::async_trait]
impl LanguageAdapter for StylusAdapter {
    fn tag(&self) -> &str {
        "styl"
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
        let stylus = engines.renderer(&self.engine.locator, &self.engine.export)?;
        let code = stylus.render(&file.content)?;

        Ok(CompileResult::code(code))
    }
}
