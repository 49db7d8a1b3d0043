//! # Repository Module
//!
//! Repository pattern implementations for the master store.

pub mod memory;
#[cfg(feature = "scylla")]
pub mod scylla_impl;
pub mod traits;

use std::sync::Arc;

pub use memory::{
    InMemoryContributionRepository, InMemoryEmployeeRepository, InMemoryEmployerRepository,
};
#[cfg(feature = "scylla")]
pub use scylla_impl::{
    ScyllaClient, ScyllaConfig, ScyllaContributionRepository, ScyllaEmployeeRepository,
    ScyllaEmployerRepository,
};
pub use traits::{ContributionRepository, EmployeeRepository, EmployerRepository};

/// Master store: one repository handle per entity type, sharing a backend
#[derive(Clone)]
pub struct MasterStore {
    pub employees: Arc<dyn EmployeeRepository>,
    pub employers: Arc<dyn EmployerRepository>,
    pub contributions: Arc<dyn ContributionRepository>,
}

impl MasterStore {
    /// Process-local store; contents vanish on shutdown
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            employees: Arc::new(InMemoryEmployeeRepository::new()),
            employers: Arc::new(InMemoryEmployerRepository::new()),
            contributions: Arc::new(InMemoryContributionRepository::new()),
        }
    }

    /// Store backed by a connected ScyllaDB client
    #[cfg(feature = "scylla")]
    #[must_use]
    pub fn scylla(client: ScyllaClient) -> Self {
        let client = Arc::new(client);
        Self {
            employees: Arc::new(ScyllaEmployeeRepository::new(client.clone())),
            employers: Arc::new(ScyllaEmployerRepository::new(client.clone())),
            contributions: Arc::new(ScyllaContributionRepository::new(client)),
        }
    }
}
