//! # API Context
//!
//! Explicit handles for the local mirror, the master data client and the
//! contribution cache, injected into every handler.

use std::sync::Arc;
use std::time::{Duration, Instant};

use payroll_persistence::{
    ContributionCache, EmployeeRepository, EmployeeSync, MasterDataClient, SharedCacheStore,
};

/// Application context
#[derive(Clone)]
pub struct ApiContext {
    /// Local employee mirror
    pub employees: Arc<dyn EmployeeRepository>,

    /// Read-repair lookups over the mirror
    pub sync: EmployeeSync,

    pub contributions: ContributionCache,

    pub started_at: Instant,
}

impl ApiContext {
    pub fn new(
        employees: Arc<dyn EmployeeRepository>,
        remote: Arc<dyn MasterDataClient>,
        cache: SharedCacheStore,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            sync: EmployeeSync::new(employees.clone(), remote.clone()),
            contributions: ContributionCache::new(cache, remote, cache_ttl),
            employees,
            started_at: Instant::now(),
        }
    }
}
