//! Cache store capability consumed by the cache-aside strategies.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;

/// String key-value store with per-entry expiry
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a raw value, `None` when absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value that expires after `ttl`, overwriting any previous value
    async fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Count resident keys matching a glob pattern such as `contributions:*`.
    ///
    /// Approximate under concurrent writes.
    async fn count_keys(&self, pattern: &str) -> Result<usize>;
}

/// Shared cache store handle
pub type SharedCacheStore = Arc<dyn CacheStore>;

/// JSON helpers over any cache store
#[async_trait]
pub trait CacheJsonExt: CacheStore {
    /// Get and deserialize a JSON value
    async fn get_json<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Serialize and store a JSON value with expiry
    async fn set_json<T: Serialize + Sync>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.set_with_ttl(key, json, ttl).await
    }
}

impl<S: CacheStore + ?Sized> CacheJsonExt for S {}
