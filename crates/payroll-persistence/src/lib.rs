//! # Payroll Persistence Library
//!
//! Storage and synchronization layer for payroll master data.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     HTTP Layer (axum)                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Strategies                              │
//! │        EmployeeSync (read-repair), ContributionCache (TTL)   │
//! └─────────────────────────────────────────────────────────────┘
//!          │                   │                     │
//!          ▼                   ▼                     ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌──────────────────────┐
//! │  Master Store   │ │   Cache Store   │ │  Master Data Client  │
//! │ (ScyllaDB/mem)  │ │  (Redis/mem)    │ │   (reqwest, HTTP)    │
//! └─────────────────┘ └─────────────────┘ └──────────────────────┘
//! ```
//!
//! ## Features
//!
//! - `scylla`: Enable ScyllaDB master store (default)
//! - `redis`: Enable Redis cache store (default)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use payroll_persistence::{
//!     CacheClient, CacheConfig, ContributionCache, EmployeeSync, HttpMasterDataClient,
//!     MasterStore, RemoteConfig,
//! };
//!
//! let store = MasterStore::in_memory();
//! let remote = Arc::new(HttpMasterDataClient::new(&RemoteConfig::default())?);
//! let cache = Arc::new(CacheClient::new(&CacheConfig::default()).await?);
//!
//! let sync = EmployeeSync::new(store.employees.clone(), remote.clone());
//! let contributions = ContributionCache::new(cache, remote, DEFAULT_CONTRIBUTIONS_TTL);
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod error;
pub mod remote;
pub mod repository;
pub mod strategy;

// Re-export commonly used types
#[cfg(feature = "redis")]
pub use cache::{CacheClient, CacheConfig};
pub use cache::{CacheStore, MemoryCache, SharedCacheStore};
pub use error::{PersistenceError, Result};
pub use remote::{HttpMasterDataClient, MasterDataClient, RemoteConfig, RemoteEmployee, RemoteError};
pub use repository::{ContributionRepository, EmployeeRepository, EmployerRepository, MasterStore};
#[cfg(feature = "scylla")]
pub use repository::{ScyllaClient, ScyllaConfig};
pub use strategy::{
    CacheStats, ContributionCache, ContributionCacheError, DEFAULT_CONTRIBUTIONS_TTL,
    EmployeeSync, Resolution,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_store_starts_empty() {
        let store = MasterStore::in_memory();
        assert!(store.employees.find_all().await.unwrap().is_empty());
        assert!(store.employers.find_all().await.unwrap().is_empty());
        assert!(
            store
                .contributions
                .find(&payroll_domain::ContributionFilter::All)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
