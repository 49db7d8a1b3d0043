//! # Strategy Module
//!
//! Synchronization policies between the local stores and master data.
//!
//! - `EmployeeSync` - read-repair: local store first, fetch and persist on miss
//! - `ContributionCache` - cache-aside with a fixed TTL, no local persistence
//!
//! ## Example
//!
//! ```rust,ignore
//! use payroll_persistence::strategy::{ContributionCache, EmployeeSync, Resolution};
//!
//! let sync = EmployeeSync::new(store.employees.clone(), remote.clone());
//! match sync.resolve("1023829A").await? {
//!     Resolution::Local(e) | Resolution::Synced(e) => println!("{}", e.id),
//!     Resolution::NotFound | Resolution::SyncFailed(_) => println!("unknown"),
//! }
//!
//! let contributions = ContributionCache::new(cache, remote, DEFAULT_CONTRIBUTIONS_TTL)
//!     .get_by_employee("1023829A")
//!     .await?;
//! ```

pub mod read_repair;
#[cfg(test)]
pub(crate) mod testing;
pub mod ttl_cache;

pub use read_repair::{EmployeeSync, Resolution};
pub use ttl_cache::{
    CONTRIBUTIONS_KEY_PREFIX, CacheStats, ContributionCache, ContributionCacheError,
    DEFAULT_CONTRIBUTIONS_TTL, contributions_key,
};
