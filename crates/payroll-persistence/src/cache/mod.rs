//! # Cache Module
//!
//! Key-value cache layer for hot-path master data lookups.

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_client;
pub mod traits;

pub use memory::MemoryCache;
#[cfg(feature = "redis")]
pub use redis_client::{CacheClient, CacheConfig};
pub use traits::{CacheJsonExt, CacheStore, SharedCacheStore};
