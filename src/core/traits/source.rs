use crate::core::{domain::Locator, errors::NativeError, traits::engine::EngineExports};

/// Fetches the engine behind a locator and runs its initialization,
/// yielding the symbols it exports.
#[mockall::automock]
#[async_trait::async_trait]
pub trait EngineSource: Send + Sync {
    async fn activate(&self, locator: &Locator) -> Result<EngineExports, NativeError>;
}
