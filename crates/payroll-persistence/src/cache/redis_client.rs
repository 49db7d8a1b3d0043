//! # Redis Cache Layer
//!
//! Redis client wrapper used as the downstream contribution cache.

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, Client};
use std::time::Duration;

use super::traits::CacheStore;
use crate::error::Result;

/// Keys fetched per SCAN round trip
const SCAN_BATCH: usize = 100;

/// Redis cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub url: String,
    /// Reconnect attempts before a command fails
    pub retries: usize,
    pub connection_timeout: Duration,
    pub response_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            retries: 3,
            connection_timeout: Duration::from_secs(5),
            response_timeout: Duration::from_secs(5),
        }
    }
}

/// Redis cache client over a reconnecting connection manager
#[derive(Clone)]
pub struct CacheClient {
    conn: ConnectionManager,
}

impl CacheClient {
    /// Create a new cache client
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the first connection fails.
    pub async fn new(config: &CacheConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())?;
        let manager_config = ConnectionManagerConfig::new()
            .set_number_of_retries(config.retries)
            .set_connection_timeout(config.connection_timeout)
            .set_response_timeout(config.response_timeout);
        let conn = ConnectionManager::new_with_config(client, manager_config).await?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheStore for CacheClient {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, value, ttl.as_secs().max(1)).await?;
        Ok(())
    }

    async fn count_keys(&self, pattern: &str) -> Result<usize> {
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut count = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            count += keys.len();
            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(count)
    }
}
