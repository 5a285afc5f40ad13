use std::{collections::HashMap, sync::Arc, time::Duration};

use dashmap::DashMap;
use serde_json::json;

use crate::core::{
    domain::Locator,
    errors::NativeError,
    traits::{engine::EngineExports, source::EngineSource},
};

type ExportsFactory = Arc<dyn Fn() -> EngineExports + Send + Sync>;

/// In-memory engine source. Every activation sleeps for `delay` and is
/// counted per locator; unknown locators fail like a script that could not
/// be fetched.
#[derive(Clone)]
pub struct EngineSourceStub {
    engines: HashMap<Locator, ExportsFactory>,
    delay: Duration,
    activations: Arc<DashMap<Locator, usize>>,
}

impl EngineSourceStub {
    pub fn new(delay: Duration) -> Self {
        Self {
            engines: HashMap::new(),
            delay,
            activations: Arc::new(DashMap::new()),
        }
    }

    pub fn with_engine<F>(mut self, locator: &Locator, factory: F) -> Self
    where
        F: Fn() -> EngineExports + Send + Sync + 'static,
    {
        self.engines.insert(locator.clone(), Arc::new(factory));
        self
    }

    pub fn activations(&self, locator: &Locator) -> usize {
        self.activations.get(locator).map(|count| *count).unwrap_or(0)
    }

    pub fn total_activations(&self) -> usize {
        self.activations.iter().map(|count| *count).sum()
    }
}

impl std::fmt::Debug for EngineSourceStub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineSourceStub")
            .field("engines", &self.engines.keys().collect::<Vec<_>>())
            .field("delay", &self.delay)
            .finish()
    }
}

#[async_trait::async_trait]
impl EngineSource for EngineSourceStub {
    #[tracing::instrument]
    async fn activate(&self, locator: &Locator) -> Result<EngineExports, NativeError> {
        *self.activations.entry(locator.clone()).or_insert(0) += 1;
        tracing::debug!("Start activation: locator={}", locator);
        tokio::time::sleep(self.delay).await;

        match self.engines.get(locator) {
            Some(factory) => Ok(factory()),
            None => Err(NativeError::Structured(json!({
                "type": "error",
                "isTrusted": true,
                "target": { "tagName": "SCRIPT", "src": locator.as_str() },
            }))),
        }
    }
}
