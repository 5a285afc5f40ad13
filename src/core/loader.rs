use std::sync::{Arc, OnceLock};

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::{BoxFuture, FutureExt, Shared};
use itertools::Itertools;

use crate::core::{
    domain::{LoadEntryInfo, LoadStatus, Locator},
    errors::LoadError,
    traits::{engine::EngineExports, source::EngineSource},
};

type LoadOutcome = Result<Arc<EngineExports>, LoadError>;
type LoadOperation = Shared<BoxFuture<'static, LoadOutcome>>;

struct EngineLoadEntry {
    requested_at: chrono::DateTime<chrono::Utc>,
    operation: LoadOperation,
    settled: Arc<OnceLock<LoadStatus>>,
}

/// Loads every engine at most once for the lifetime of the loader.
///
/// Entries are never evicted, so a failed load stays failed until the
/// loader is dropped. Callers asking for the same locator share one
/// in-flight operation and observe the same outcome.
pub struct EngineLoader {
    source: Arc<dyn EngineSource>,
    entries: DashMap<Locator, EngineLoadEntry>,
}

impl EngineLoader {
    pub fn new(source: Arc<dyn EngineSource>) -> Self {
        Self {
            source,
            entries: DashMap::new(),
        }
    }

    /// Resolves once the engine behind `locator` is fetched and initialized.
    ///
    /// Must be called from within a tokio runtime: the first request for a
    /// locator spawns the activation so that it runs to completion even if
    /// every caller stops waiting.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self, locator: &Locator) -> Result<Arc<EngineExports>, LoadError> {
        let operation = self.operation(locator);
        operation.await
    }

    pub fn status(&self, locator: &Locator) -> Option<LoadStatus> {
        self.entries.get(locator).map(|entry| status_of(&entry))
    }

    pub fn is_loaded(&self, locator: &Locator) -> bool {
        matches!(self.status(locator), Some(LoadStatus::Loaded))
    }

    pub fn entries(&self) -> Vec<(Locator, LoadEntryInfo)> {
        self.entries
            .iter()
            .map(|entry| {
                (
                    entry.key().clone(),
                    LoadEntryInfo {
                        requested_at: entry.requested_at,
                        status: status_of(&entry),
                    },
                )
            })
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
            .collect()
    }

    fn operation(&self, locator: &Locator) -> LoadOperation {
        // The shard lock is released before the caller awaits.
        match self.entries.entry(locator.clone()) {
            Entry::Occupied(entry) => {
                tracing::debug!("Compiler already requested, reusing load");
                entry.get().operation.clone()
            }
            Entry::Vacant(entry) => {
                let settled = Arc::new(OnceLock::new());
                let operation = self.spawn_activation(locator, settled.clone());
                entry.insert(EngineLoadEntry {
                    requested_at: chrono::Utc::now(),
                    operation: operation.clone(),
                    settled,
                });
                operation
            }
        }
    }

    fn spawn_activation(&self, locator: &Locator, settled: Arc<OnceLock<LoadStatus>>) -> LoadOperation {
        tracing::info!("Loading compiler from {}", locator);

        let source = self.source.clone();
        let task_locator = locator.clone();
        let task_settled = settled.clone();
        let handle = tokio::spawn(async move {
            let result = source
                .activate(&task_locator)
                .await
                .map(Arc::new)
                .map_err(|e| LoadError::new(&task_locator, &e));

            match &result {
                Ok(exports) => tracing::info!(
                    "Compiler loaded from {}: exports={:?}",
                    task_locator,
                    exports.symbols().sorted().collect::<Vec<_>>()
                ),
                Err(e) => tracing::error!("{}", e),
            }
            let _ = task_settled.set(settle(&result));
            result
        });

        let locator = locator.clone();
        async move {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_error) => {
                    let err = LoadError::new(&locator, &join_error);
                    tracing::error!("{}", err);
                    Err(err)
                }
            };
            let _ = settled.set(settle(&result));
            result
        }
        .boxed()
        .shared()
    }
}

fn settle(result: &LoadOutcome) -> LoadStatus {
    match result {
        Ok(_) => LoadStatus::Loaded,
        Err(e) => LoadStatus::Failed { msg: e.to_string() },
    }
}

fn status_of(entry: &EngineLoadEntry) -> LoadStatus {
    if let Some(status) = entry.settled.get() {
        return status.clone();
    }
    entry
        .operation
        .peek()
        .map(settle)
        .unwrap_or(LoadStatus::Pending)
}
