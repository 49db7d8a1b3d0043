//! # API Context
//!
//! Application state shared by all handlers.

use std::time::Instant;

use payroll_persistence::MasterStore;

/// Application context
#[derive(Clone)]
pub struct ApiContext {
    /// Master store for all entity types
    pub store: MasterStore,

    pub started_at: Instant,
}

impl ApiContext {
    #[must_use]
    pub fn new(store: MasterStore) -> Self {
        Self {
            store,
            started_at: Instant::now(),
        }
    }

    /// Context over a fresh in-memory store
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MasterStore::in_memory())
    }
}
