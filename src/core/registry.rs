use std::collections::HashMap;
use std::sync::Arc;

use futures::future::try_join_all;
use itertools::Itertools;

use crate::core::{
    domain::{CompileResult, Locator, SourceFile},
    errors::CompileError,
    loader::EngineLoader,
    traits::adapter::{EngineSet, LanguageAdapter},
};

/// Maps language tags to their adapters and drives a compile through
/// engine loading and the adapter's native call.
pub struct AdapterRegistry {
    loader: Arc<EngineLoader>,
    adapters: HashMap<String, Arc<dyn LanguageAdapter>>,
}

impl AdapterRegistry {
    pub fn new(loader: Arc<EngineLoader>) -> Self {
        Self {
            loader,
            adapters: HashMap::new(),
        }
    }

    /// Registers an adapter under its tag, replacing any previous one.
    pub fn register(&mut self, adapter: impl LanguageAdapter + 'static) {
        self.adapters
            .insert(adapter.tag().to_string(), Arc::new(adapter));
    }

    pub fn tags(&self) -> Vec<&str> {
        self.adapters.keys().map(String::as_str).sorted().collect()
    }

    pub fn loader(&self) -> &Arc<EngineLoader> {
        &self.loader
    }

    pub fn adapter(&self, tag: &str) -> Result<Arc<dyn LanguageAdapter>, CompileError> {
        self.adapters
            .get(tag)
            .cloned()
            .ok_or_else(|| CompileError::UnsupportedLanguage {
                tag: tag.to_string(),
            })
    }

    /// Locators the adapter needs that have not finished loading yet.
    pub fn pending_locators(&self, adapter: &dyn LanguageAdapter) -> Vec<Locator> {
        adapter
            .locators()
            .into_iter()
            .unique()
            .filter(|locator| !self.loader.is_loaded(locator))
            .collect()
    }

    /// Loads every engine the adapter needs. The loads are independent and
    /// awaited jointly; the first failure wins.
    #[tracing::instrument(skip_all, fields(tag = adapter.tag()))]
    pub async fn load_engines(&self, adapter: &dyn LanguageAdapter) -> Result<EngineSet, CompileError> {
        let locators = adapter.locators().into_iter().unique().collect_vec();
        let exports = try_join_all(locators.iter().map(|locator| self.loader.load(locator))).await?;

        let mut engines = EngineSet::new();
        for (locator, exports) in locators.into_iter().zip(exports) {
            engines.insert(locator, exports);
        }
        Ok(engines)
    }

    #[tracing::instrument(skip(self, file), fields(file = %file.name))]
    pub async fn compile(&self, tag: &str, file: &SourceFile) -> Result<CompileResult, CompileError> {
        let adapter = self.adapter(tag)?;
        let engines = self.load_engines(adapter.as_ref()).await?;

        let result = adapter.compile(&engines, file).await;
        match &result {
            Ok(output) => tracing::debug!(
                "Compiled {} bytes, source map: {}",
                output.code.len(),
                output.source_map.is_some()
            ),
            Err(e) => tracing::warn!("Compilation failed: {}", e),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::default_registry,
        config::EngineConfig,
        core::{domain::LoadStatus, traits::source::MockEngineSource},
        stubs::stub_registry,
    };
    use std::time::Duration;

    fn stylus_file() -> SourceFile {
        SourceFile::new("main.styl", "body\n  color red")
    }

    #[tokio::test]
    async fn test_unsupported_language_fails_before_loading() {
        let mut source = MockEngineSource::new();
        source.expect_activate().never();
        let loader = Arc::new(EngineLoader::new(Arc::new(source)));
        let registry = default_registry(loader.clone(), &EngineConfig::default());

        let err = registry
            .compile("elm", &SourceFile::new("Main.elm", "main = text \"hi\""))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            CompileError::UnsupportedLanguage {
                tag: "elm".to_string()
            }
        );
        assert_eq!(err.to_string(), "Unsupported language: elm");
        assert!(loader.entries().is_empty());
    }

    #[test]
    fn test_default_tags() {
        let loader = Arc::new(EngineLoader::new(Arc::new(MockEngineSource::new())));
        let registry = default_registry(loader, &EngineConfig::default());

        assert_eq!(
            registry.tags(),
            vec!["babel", "coffee", "less", "ls", "sass", "scss", "styl", "ts"]
        );
    }

    #[tokio::test]
    async fn test_stylesheet_scenario() {
        let (_, registry) = stub_registry(&EngineConfig::default(), Duration::ZERO);

        let result = registry.compile("styl", &stylus_file()).await.unwrap();

        assert!(result.code.contains("color: red"));
        assert_eq!(result.source_map, None);
    }

    #[tokio::test]
    async fn test_repeated_compile_is_independent_and_loads_once() {
        let config = EngineConfig::default();
        let (source, registry) = stub_registry(&config, Duration::from_millis(10));

        let first = registry.compile("styl", &stylus_file()).await.unwrap();
        let second = registry.compile("styl", &stylus_file()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.activations(&config.stylus.locator), 1);
    }

    #[tokio::test]
    async fn test_concurrent_compiles_share_engine_load() {
        let config = EngineConfig::default();
        let (source, registry) = stub_registry(&config, Duration::from_millis(30));
        let scss = SourceFile::new("main.scss", "a { color: red; }");
        let sass = SourceFile::new("main.sass", "a\n  color: red");

        let (scss_result, sass_result) =
            tokio::join!(registry.compile("scss", &scss), registry.compile("sass", &sass));

        assert!(scss_result.unwrap().code.contains("color: red"));
        assert!(sass_result.unwrap().code.contains("color: red"));
        assert_eq!(source.activations(&config.sass.locator), 1);
        assert_eq!(source.total_activations(), 1);
    }

    #[tokio::test]
    async fn test_chained_adapter_loads_both_engines_once() {
        let config = EngineConfig::default();
        let (source, registry) = stub_registry(&config, Duration::from_millis(30));
        let file = SourceFile::new("main.coffee", "square = (x) -> x * x");

        registry.compile("coffee", &file).await.unwrap();
        registry
            .compile("babel", &SourceFile::new("main.js", "const a = 1;"))
            .await
            .unwrap();

        assert_eq!(source.activations(&config.coffeescript.locator), 1);
        assert_eq!(source.activations(&config.babel.locator), 1);
    }

    #[tokio::test]
    async fn test_load_failure_is_reported_and_sticky() {
        let config = EngineConfig::default();
        let (source, mut registry) = stub_registry(&config, Duration::ZERO);
        registry.register(crate::adapters::stylus::StylusAdapter::new(
            crate::config::EngineEntry::new("https://cdn.example/gone.js", "stylus"),
        ));

        let first = registry.compile("styl", &stylus_file()).await.unwrap_err();
        let second = registry.compile("styl", &stylus_file()).await.unwrap_err();

        assert!(matches!(first, CompileError::Load(_)));
        assert!(
            first
                .to_string()
                .starts_with("Could not load compiler from https://cdn.example/gone.js")
        );
        assert_eq!(first, second);
        assert_eq!(
            source.activations(&Locator::new("https://cdn.example/gone.js")),
            1
        );
        assert!(matches!(
            registry
                .loader()
                .status(&Locator::new("https://cdn.example/gone.js")),
            Some(LoadStatus::Failed { .. })
        ));
    }

    #[tokio::test]
    async fn test_pending_locators_shrink_after_load() {
        let config = EngineConfig::default();
        let (_, registry) = stub_registry(&config, Duration::ZERO);
        let adapter = registry.adapter("coffee").unwrap();

        assert_eq!(
            registry.pending_locators(adapter.as_ref()),
            vec![
                config.coffeescript.locator.clone(),
                config.babel.locator.clone()
            ]
        );

        registry.load_engines(adapter.as_ref()).await.unwrap();
        assert!(registry.pending_locators(adapter.as_ref()).is_empty());
    }
}
