//! Cache-aside contribution lookups with a fixed TTL.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

use crate::cache::{CacheJsonExt, SharedCacheStore};
use crate::error::PersistenceError;
use crate::remote::{MasterDataClient, RemoteError};
use payroll_domain::Contribution;

/// Key prefix shared by every cached contribution list
pub const CONTRIBUTIONS_KEY_PREFIX: &str = "contributions:";

/// Default lifetime of a cached contribution list
pub const DEFAULT_CONTRIBUTIONS_TTL: Duration = Duration::from_secs(60);

#[must_use]
pub fn contributions_key(rssb_number: &str) -> String {
    format!("{CONTRIBUTIONS_KEY_PREFIX}{rssb_number}")
}

#[derive(Debug, thiserror::Error)]
pub enum ContributionCacheError {
    #[error("Master data unavailable: {0}")]
    Upstream(#[from] RemoteError),

    #[error("Cache store error: {0}")]
    Store(#[from] PersistenceError),
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hit: u64,
    pub miss: u64,
    /// Resident contribution keys, approximate
    pub keys: usize,
}

#[derive(Debug, Default)]
struct Counters {
    hit: AtomicU64,
    miss: AtomicU64,
}

/// Contribution lists per employee, cached for a fixed TTL
#[derive(Clone)]
pub struct ContributionCache {
    cache: SharedCacheStore,
    remote: Arc<dyn MasterDataClient>,
    ttl: Duration,
    counters: Arc<Counters>,
}

impl ContributionCache {
    pub fn new(cache: SharedCacheStore, remote: Arc<dyn MasterDataClient>, ttl: Duration) -> Self {
        Self {
            cache,
            remote,
            ttl,
            counters: Arc::new(Counters::default()),
        }
    }

    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Contributions for an employee, in master data order.
    ///
    /// An unreadable cache entry counts as a miss. A failed cache write is
    /// logged and the fetched list is still returned.
    ///
    /// # Errors
    ///
    /// Returns `ContributionCacheError::Upstream` when the list is not cached
    /// and master data cannot provide it.
    pub async fn get_by_employee(
        &self,
        rssb_number: &str,
    ) -> Result<Vec<Contribution>, ContributionCacheError> {
        let key = contributions_key(rssb_number);

        let cached: Result<Option<Vec<Contribution>>, PersistenceError> =
            self.cache.get_json(&key).await;
        match cached {
            Ok(Some(contributions)) => {
                self.counters.hit.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %key, count = contributions.len(), "Contribution cache hit");
                return Ok(contributions);
            }
            Ok(None) => tracing::debug!(key = %key, "Contribution cache miss"),
            Err(e) => tracing::warn!(key = %key, error = %e, "Contribution cache read failed, treating as miss"),
        }
        self.counters.miss.fetch_add(1, Ordering::Relaxed);

        let contributions = self.remote.get_contributions(rssb_number).await.map_err(|e| {
            tracing::warn!(rssb_number, kind = e.kind(), error = %e, "Contribution fetch failed");
            e
        })?;

        if let Err(e) = self.cache.set_json(&key, &contributions, self.ttl).await {
            tracing::warn!(key = %key, error = %e, "Failed to populate contribution cache");
        }

        Ok(contributions)
    }

    /// Hit/miss counters since start-up and resident key count
    ///
    /// # Errors
    ///
    /// Returns `ContributionCacheError::Store` when the key scan fails.
    pub async fn stats(&self) -> Result<CacheStats, ContributionCacheError> {
        let pattern = format!("{CONTRIBUTIONS_KEY_PREFIX}*");
        let keys = self.cache.count_keys(&pattern).await?;

        Ok(CacheStats {
            hit: self.counters.hit.load(Ordering::Relaxed),
            miss: self.counters.miss.load(Ordering::Relaxed),
            keys,
        })
    }
}
