use async_trait::async_trait;

use crate::errors::StoreError;
use crate::handle::StoreHandle;

/// Trait abstraction adapters use to reach the store.
/// `StoreHandle` is the production implementation; tests may plug in others.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn set(&self, key: String, value: String) -> Result<String, StoreError>;
    async fn get(&self, key: String) -> Result<Option<String>, StoreError>;
    async fn delete(&self, key: String) -> Result<bool, StoreError>;
}

#[async_trait]
impl KvStore for StoreHandle {
    async fn set(&self, key: String, value: String) -> Result<String, StoreError> {
        StoreHandle::set(self, key, value).await
    }

    async fn get(&self, key: String) -> Result<Option<String>, StoreError> {
        StoreHandle::get(self, key).await
    }

    async fn delete(&self, key: String) -> Result<bool, StoreError> {
        StoreHandle::delete(self, key).await
    }
}
