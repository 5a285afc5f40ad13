//! Two-engine pipelines.
//!
//! The front engine lowers the source to JavaScript together with a source
//! map; the back engine transforms that JavaScript, taking the front map as
//! its input map so the final map points at the original file.

use crate::{
    adapters::babel,
    config::EngineEntry,
    core::{
        domain::{CompileResult, Locator, SourceFile},
        errors::CompileError,
        traits::{
            adapter::{EngineSet, LanguageAdapter},
            engine::{MapMode, ScriptOptions},
        },
    },
};

/// Front-stage output handed to the back stage.
#[derive(Clone, Debug, PartialEq)]
pub struct Intermediate {
    pub code: String,
    pub source_map: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct ChainedAdapter {
    tag: &'static str,
    front: EngineEntry,
    back: EngineEntry,
}

impl ChainedAdapter {
    pub fn new(tag: &'static str, front: EngineEntry, back: EngineEntry) -> Self {
        Self { tag, front, back }
    }

    /// CoffeeScript lowered by Babel.
    pub fn coffee(coffeescript: EngineEntry, babel: EngineEntry) -> Self {
        Self::new("coffee", coffeescript, babel)
    }

    fn lower_front(
        &self,
        engines: &EngineSet,
        file: &SourceFile,
    ) -> Result<Intermediate, CompileError> {
        let front = engines.script(&self.front.locator, &self.front.export)?;
        let options = ScriptOptions {
            filename: file.name.clone(),
            map: MapMode::Linked,
        };

        let output = front.compile(&file.content, &options)?;
        let map = output
            .source_map
            .ok_or_else(|| CompileError::CompilationFailed {
                msg: format!(
                    "Compiler from {} produced no source map for {}",
                    self.front.locator, file.name
                ),
            })?;
        let source_map =
            serde_json::from_str(&map).map_err(|e| CompileError::CompilationFailed {
                msg: format!("Invalid intermediate source map for {}: {}", file.name, e),
            })?;

        Ok(Intermediate {
            code: output.code,
            source_map,
        })
    }

    fn lower_back(
        &self,
        engines: &EngineSet,
        file: &SourceFile,
        intermediate: Intermediate,
    ) -> Result<CompileResult, CompileError> {
        let back = engines.transformer(&self.back.locator, &self.back.export)?;
        let options = babel::transform_options(&file.name, Some(intermediate.source_map));

        let output = back.transform(&intermediate.code, &options)?;

        Ok(babel::into_result(output))
    }
}

#[async_trait::async_trait]
impl LanguageAdapter for ChainedAdapter {
    fn tag(&self) -> &str {
        self.tag
    }

    fn locators(&self) -> Vec<Locator> {
        vec![self.front.locator.clone(), self.back.locator.clone()]
    }

    #[tracing::instrument(skip(self, engines), fields(tag = self.tag))]
    async fn compile(
        &self,
        engines: &EngineSet,
        file: &SourceFile,
    ) -> Result<CompileResult, CompileError> {
        let intermediate = self.lower_front(engines, file)?;
        tracing::debug!(
            "Intermediate code: {} bytes from {}",
            intermediate.code.len(),
            self.front.locator
        );

        self.lower_back(engines, file, intermediate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::EngineConfig,
        core::{
            errors::NativeError,
            traits::engine::{EngineExport, EngineExports, ScriptCompiler, ScriptOutput},
        },
        stubs::{
            engines::{BabelStub, CoffeeScriptStub},
            mappings::LineMap,
            stub_registry,
        },
    };
    use std::{sync::Arc, time::Duration};

    const MARKER: &str = "marker = 'original line five'";

    fn ten_line_file() -> SourceFile {
        let lines: Vec<String> = (1..=10)
            .map(|n| {
                if n == 5 {
                    MARKER.to_string()
                } else {
                    format!("value{} = {}", n, n)
                }
            })
            .collect();
        SourceFile::new("main.coffee", &lines.join("\n"))
    }

    fn generated_line_of(code: &str, needle: &str) -> u32 {
        code.lines()
            .position(|line| line.contains(needle))
            .expect("marker should be present in output") as u32
    }

    #[tokio::test]
    async fn test_final_map_points_at_original_line() {
        let (_, registry) = stub_registry(&EngineConfig::default(), Duration::ZERO);
        let file = ten_line_file();

        let result = registry.compile("coffee", &file).await.unwrap();

        let generated = generated_line_of(&result.code, MARKER);
        let map = LineMap::parse(result.source_map.as_deref().unwrap()).unwrap();
        // 0-based: original line 5 is index 4.
        assert_eq!(map.original_line(generated), Some(4));
        assert_eq!(map.source, "main.coffee");
    }

    #[tokio::test]
    async fn test_intermediate_positions_are_remapped() {
        let config = EngineConfig::default();
        let file = ten_line_file();
        let adapter = ChainedAdapter::coffee(config.coffeescript.clone(), config.babel.clone());
        let engines = engines(&adapter, Arc::new(CoffeeScriptStub));

        let intermediate = adapter.lower_front(&engines, &file).unwrap();
        let intermediate_line = generated_line_of(&intermediate.code, MARKER);

        let result = adapter.lower_back(&engines, &file, intermediate).unwrap();
        let generated = generated_line_of(&result.code, MARKER);
        let map = LineMap::parse(&result.source_map.unwrap()).unwrap();

        assert_ne!(intermediate_line, 4);
        assert_eq!(map.original_line(generated), Some(4));
    }

    #[derive(Clone, Debug)]
    struct MaplessCompiler;

    impl ScriptCompiler for MaplessCompiler {
        fn compile(&self, source: &str, _options: &ScriptOptions) -> Result<ScriptOutput, NativeError> {
            Ok(ScriptOutput {
                code: source.to_string(),
                source_map: None,
            })
        }
    }

    fn engines(adapter: &ChainedAdapter, front: Arc<dyn ScriptCompiler>) -> EngineSet {
        let mut engines = EngineSet::new();
        engines.insert(
            adapter.front.locator.clone(),
            Arc::new(EngineExports::new().with(&adapter.front.export, EngineExport::Script(front))),
        );
        engines.insert(
            adapter.back.locator.clone(),
            Arc::new(
                EngineExports::new()
                    .with(&adapter.back.export, EngineExport::Transformer(Arc::new(BabelStub))),
            ),
        );
        engines
    }

    #[tokio::test]
    async fn test_front_without_map_fails() {
        let config = EngineConfig::default();
        let adapter = ChainedAdapter::coffee(config.coffeescript.clone(), config.babel.clone());
        let engines = engines(&adapter, Arc::new(MaplessCompiler));

        let err = adapter
            .compile(&engines, &SourceFile::new("main.coffee", "a = 1"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("produced no source map for main.coffee"));
    }

    #[tokio::test]
    async fn test_front_failure_stops_pipeline() {
        let config = EngineConfig::default();
        let adapter = ChainedAdapter::coffee(config.coffeescript.clone(), config.babel.clone());
        let engines = engines(&adapter, Arc::new(CoffeeScriptStub));

        let err = adapter
            .compile(&engines, &SourceFile::new("main.coffee", "f = (x -> x"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "SyntaxError: missing or unexpected `(`");
    }
}
