use std::path::{Path, PathBuf};

use tokio::fs;

use crate::core::{
    domain::Locator,
    errors::NativeError,
    traits::{engine::EngineExports, source::EngineSource},
};

const FILE_SCHEME: &str = "file://";

/// Retrieves the script behind a locator.
#[mockall::automock]
#[async_trait::async_trait]
pub trait ScriptFetcher: Send + Sync {
    async fn fetch(&self, locator: &Locator) -> Result<Vec<u8>, NativeError>;
}

/// Executes a fetched engine script and collects the symbols it exports.
#[mockall::automock]
pub trait EngineRuntime: Send + Sync {
    fn execute(&self, locator: &Locator, script: &[u8]) -> Result<EngineExports, NativeError>;
}

#[derive(Clone, Debug)]
pub struct FetchingSource<F, R> {
    fetcher: F,
    runtime: R,
}

impl<F, R> FetchingSource<F, R>
where
    F: ScriptFetcher,
    R: EngineRuntime,
{
    pub fn new(fetcher: F, runtime: R) -> Self {
        Self { fetcher, runtime }
    }
}

#[async_trait::async_trait]
impl<F, R> EngineSource for FetchingSource<F, R>
where
    F: ScriptFetcher,
    R: EngineRuntime,
{
    #[tracing::instrument(skip(self))]
    async fn activate(&self, locator: &Locator) -> Result<EngineExports, NativeError> {
        let script = self.fetcher.fetch(locator).await?;
        tracing::debug!("Fetched {} bytes", script.len());

        let exports = self.runtime.execute(locator, &script)?;
        tracing::debug!(
            "Exported symbols: {:?}",
            exports.symbols().collect::<Vec<_>>()
        );

        Ok(exports)
    }
}

/// Reads engine scripts from disk. `file://` locators are taken as
/// absolute paths, bare paths are resolved under `root`.
#[derive(Clone, Debug)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new<T: AsRef<Path>>(root: T) -> Self {
        FileFetcher {
            root: root.as_ref().into(),
        }
    }

    fn resolve(&self, locator: &Locator) -> Result<PathBuf, NativeError> {
        let raw = locator.as_str();
        if let Some(path) = raw.strip_prefix(FILE_SCHEME) {
            return Ok(PathBuf::from(path));
        }
        if raw.contains("://") {
            return Err(NativeError::Message(format!(
                "Unsupported locator scheme: {}",
                raw
            )));
        }
        Ok(self.root.join(raw))
    }
}

#[async_trait::async_trait]
impl ScriptFetcher for FileFetcher {
    async fn fetch(&self, locator: &Locator) -> Result<Vec<u8>, NativeError> {
        let path = self.resolve(locator)?;
        fs::read(&path).await.map_err(NativeError::thrown)
    }
}
