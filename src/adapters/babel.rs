use crate::{
    config::EngineEntry,
    constants::BABEL_PRESETS,
    core::{
        domain::{CompileResult, Locator, SourceFile},
        errors::CompileError,
        traits::{
            adapter::{EngineSet, LanguageAdapter},
            engine::{TransformOptions, TransformOutput},
        },
    },
};

#[derive(Debug, Clone)]
pub struct BabelAdapter {
    engine: EngineEntry,
}

impl BabelAdapter {
    pub fn new(engine: EngineEntry) -> Self {
        Self { engine }
    }
}

#[async_trait::async_trait]
impl LanguageAdapter for BabelAdapter {
    fn tag(&self) -> &str {
        "babel"
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
        let babel = engines.transformer(&self.engine.locator, &self.engine.export)?;
        let output = babel.transform(&file.content, &transform_options(&file.name, None))?;

        Ok(into_result(output))
    }
}

pub(crate) fn transform_options(
    file_name: &str,
    input_source_map: Option<serde_json::Value>,
) -> TransformOptions {
    TransformOptions {
        presets: BABEL_PRESETS.iter().map(|p| p.to_string()).collect(),
        source_maps: true,
        source_file_name: file_name.to_string(),
        input_source_map,
    }
}

pub(crate) fn into_result(output: TransformOutput) -> CompileResult {
    CompileResult::with_source_map(output.code, output.map.map(|map| map.to_string()))
}
