use crate::{
    config::EngineEntry,
    constants::SOURCE_MAPPING_URL,
    core::{
        domain::{CompileResult, Locator, SourceFile},
        errors::CompileError,
        traits::{
            adapter::{EngineSet, LanguageAdapter},
            engine::{JsxEmit, TranspileOptions},
        },
    },
};

#[derive(Debug, Clone)]
pub struct TypeScriptAdapter {
    engine: EngineEntry,
}

impl TypeScriptAdapter {
    pub fn new(engine: EngineEntry) -> Self {
        Self { engine }
    }
}

#[async_trait::async_trait]
impl LanguageAdapter for TypeScriptAdapter {
    fn tag(&self) -> &str {
        "ts"
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
        let ts = engines.transpiler(&self.engine.locator, &self.engine.export)?;
        let options = TranspileOptions {
            file_name: file.name.clone(),
            source_map: true,
            jsx: JsxEmit::React,
        };

        let output = ts.transpile_module(&file.content, &options);

        Ok(CompileResult::with_source_map(
            strip_source_mapping_url(&output.output_text),
            output.source_map_text,
        ))
    }
}

/// Removes the trailing `//# sourceMappingURL=` line the transpiler appends.
fn strip_source_mapping_url(code: &str) -> &str {
    let body = code.strip_suffix('\n').unwrap_or(code);
    match body.rfind('\n') {
        Some(idx) if body[idx + 1..].starts_with(SOURCE_MAPPING_URL) => &body[..idx],
        None if body.starts_with(SOURCE_MAPPING_URL) => "",
        _ => code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::test_support::engines, config::EngineConfig, core::traits::engine::EngineExport,
        stubs::{engines::TypeScriptStub, mappings::LineMap},
    };
    use std::sync::Arc;

    #[test]
    fn test_strip_source_mapping_url() {
        assert_eq!(
            strip_source_mapping_url("var a = 1;\n//# sourceMappingURL=main.js.map"),
            "var a = 1;"
        );
        assert_eq!(
            strip_source_mapping_url("var a = 1;\n//# sourceMappingURL=main.js.map\n"),
            "var a = 1;"
        );
        assert_eq!(strip_source_mapping_url("var a = 1;\nvar b;"), "var a = 1;\nvar b;");
        assert_eq!(strip_source_mapping_url("var a = 1;"), "var a = 1;");
        assert_eq!(strip_source_mapping_url("//# sourceMappingURL=a.js.map"), "");
    }

    #[tokio::test]
    async fn test_transpiles_with_map_and_clean_code() {
        let adapter = TypeScriptAdapter::new(EngineConfig::default().typescript);
        let engines = engines(vec![(
            &adapter.engine,
            EngineExport::Transpiler(Arc::new(TypeScriptStub)),
        )]);

        let result = adapter
            .compile(
                &engines,
                &SourceFile::new("main.ts", "let answer: number = 42;\nconsole.log(answer);"),
            )
            .await
            .unwrap();

        assert_eq!(
            result.code,
            "\"use strict\";\nlet answer = 42;\nconsole.log(answer);"
        );
        assert!(!result.code.contains("sourceMappingURL"));

        let map = LineMap::parse(&result.source_map.unwrap()).unwrap();
        assert_eq!(map.source, "main.ts");
        assert_eq!(map.original_line(2), Some(1));
    }
}
