use crate::{
    config::EngineEntry,
    core::{
        domain::{CompileResult, Locator, SourceFile},
        errors::CompileError,
        traits::adapter::{EngineSet, LanguageAdapter},
    },
};

#[derive(Debug, Clone)]
pub struct LessAdapter {
    engine: EngineEntry,
}

impl LessAdapter {
    pub fn new(engine: EngineEntry) -> Self {
        Self { engine }
    }
}

#[async_trait::async_trait]
impl LanguageAdapter for LessAdapter {
    fn tag(&self) -> &str {
        "less"
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
        let less = engines.async_renderer(&self.engine.locator, &self.engine.export)?;
        let output = less.render(&file.content).await?;

        Ok(CompileResult::code(output.css))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::test_support::engines, config::EngineConfig, core::traits::engine::EngineExport,
        stubs::engines::LessStub,
    };
    use std::sync::Arc;

    fn setup() -> (LessAdapter, EngineSet) {
        let adapter = LessAdapter::new(EngineConfig::default().less);
        let engines = engines(vec![(
            &adapter.engine,
            EngineExport::AsyncRenderer(Arc::new(LessStub)),
        )]);
        (adapter, engines)
    }

    #[tokio::test]
    async fn test_renders_css() {
        let (adapter, engines) = setup();

        let result = adapter
            .compile(
                &engines,
                &SourceFile::new("main.less", "@brand: #f00;\n.btn { color: @brand; }"),
            )
            .await
            .unwrap();

        assert_eq!(result, CompileResult::code(".btn { color: #f00; }\n"));
    }

    #[tokio::test]
    async fn test_structured_rejection_uses_message_field() {
        let (adapter, engines) = setup();

        let err = adapter
            .compile(&engines, &SourceFile::new("main.less", ".btn { color: red;"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Unrecognised input near `{`");
    }
}
