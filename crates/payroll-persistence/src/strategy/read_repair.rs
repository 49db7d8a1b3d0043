//! Read-repair synchronization for employees.
//!
//! A lookup is served from the local store when possible. On a local miss
//! the employee is fetched from master data, persisted locally and returned,
//! so later lookups for the same RSSB number never leave the process.

use std::sync::Arc;

use crate::error::Result;
use crate::remote::{MasterDataClient, RemoteError};
use crate::repository::EmployeeRepository;
use payroll_domain::{Employee, timestamp_now};

/// Outcome of an employee lookup
#[derive(Debug)]
pub enum Resolution {
    /// Already mirrored locally; master data was not contacted
    Local(Employee),
    /// Fetched from master data and persisted
    Synced(Employee),
    /// Unknown locally and to master data
    NotFound,
    /// Master data could not be used; nothing was persisted
    SyncFailed(RemoteError),
}

impl Resolution {
    #[must_use]
    pub fn into_employee(self) -> Option<Employee> {
        match self {
            Self::Local(employee) | Self::Synced(employee) => Some(employee),
            Self::NotFound | Self::SyncFailed(_) => None,
        }
    }

    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::Synced(_) => "synced",
            Self::NotFound => "not_found",
            Self::SyncFailed(_) => "sync_failed",
        }
    }
}

/// Employee lookup with auto-sync on miss
#[derive(Clone)]
pub struct EmployeeSync {
    local: Arc<dyn EmployeeRepository>,
    remote: Arc<dyn MasterDataClient>,
}

impl EmployeeSync {
    pub fn new(local: Arc<dyn EmployeeRepository>, remote: Arc<dyn MasterDataClient>) -> Self {
        Self { local, remote }
    }

    /// Resolve an employee by RSSB number.
    ///
    /// Master data failures are reported through the resolution, never as
    /// errors.
    ///
    /// # Errors
    ///
    /// Returns the local store error when the store itself fails.
    pub async fn resolve(&self, rssb_number: &str) -> Result<Resolution> {
        if let Some(employee) = self.local.find_by_rssb_number(rssb_number).await? {
            tracing::debug!(rssb_number, "Employee served from local store");
            return Ok(Resolution::Local(employee));
        }

        tracing::debug!(rssb_number, "Employee not in local store, fetching from master data");

        let remote = match self.remote.get_employee(rssb_number).await {
            Ok(remote) => remote,
            Err(e) if e.is_not_found() => {
                tracing::info!(rssb_number, "Employee unknown to master data");
                return Ok(Resolution::NotFound);
            }
            Err(e) => {
                tracing::warn!(rssb_number, kind = e.kind(), error = %e, "Employee sync failed");
                return Ok(Resolution::SyncFailed(e));
            }
        };

        if remote.rssb_number != rssb_number {
            let err = RemoteError::KeyMismatch {
                requested: rssb_number.to_string(),
                returned: remote.rssb_number,
            };
            tracing::warn!(rssb_number, error = %err, "Employee sync failed");
            return Ok(Resolution::SyncFailed(err));
        }

        let candidate = remote.into_local(timestamp_now());

        match self.local.create(&candidate).await {
            Ok(employee) => {
                tracing::info!(rssb_number, id = %employee.id, "Employee synced from master data");
                Ok(Resolution::Synced(employee))
            }
            Err(e) if e.is_conflict() => {
                tracing::debug!(rssb_number, "Employee created concurrently, re-reading");
                match self.local.find_by_rssb_number(rssb_number).await? {
                    Some(existing) => Ok(Resolution::Synced(existing)),
                    None => Err(e),
                }
            }
            Err(e) => {
                tracing::error!(rssb_number, error = %e, "Failed to persist synced employee");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::testing::{
        CountingEmployeeRepository, RacingEmployeeRepository, StubMasterData,
        UnavailableEmployeeRepository, john_doe,
    };
    use chrono::NaiveDate;
    use tokio_test::assert_err;

    #[tokio::test]
    async fn test_local_hit_skips_master_data() {
        let remote = StubMasterData::new();
        let local = CountingEmployeeRepository::new();
        let existing = john_doe().into_local(timestamp_now());
        local.inner.create(&existing).await.unwrap();

        let sync = EmployeeSync::new(local.clone(), remote.clone());
        let resolution = sync.resolve("1023829A").await.unwrap();

        assert!(matches!(resolution, Resolution::Local(ref e) if *e == existing));
        assert_eq!(remote.employee_calls(), 0);
        assert_eq!(local.creates(), 0);
    }

    #[tokio::test]
    async fn test_miss_syncs_once_then_serves_locally() {
        let remote = StubMasterData::new();
        remote.serve_employee("1023829A", john_doe()).await;
        let local = CountingEmployeeRepository::new();
        let sync = EmployeeSync::new(local.clone(), remote.clone());

        let first = sync.resolve("1023829A").await.unwrap();
        assert_eq!(first.path(), "synced");
        let synced = first.into_employee().unwrap();
        assert_eq!(synced.id, "e1");
        assert_eq!(synced.firstname, "John");
        assert_eq!(synced.lastname, "Doe");
        assert_eq!(synced.rssb_number, "1023829A");
        assert_eq!(synced.dob, NaiveDate::from_ymd_opt(1990, 1, 15).unwrap());

        let second = sync.resolve("1023829A").await.unwrap();
        assert_eq!(second.path(), "local");
        assert_eq!(second.into_employee().unwrap(), synced);

        assert_eq!(remote.employee_calls(), 1);
        assert_eq!(local.creates(), 1);
        assert_eq!(local.inner.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_everywhere_is_not_found_without_write() {
        let remote = StubMasterData::new();
        let local = CountingEmployeeRepository::new();
        let sync = EmployeeSync::new(local.clone(), remote.clone());

        let resolution = sync.resolve("9999999Z").await.unwrap();

        assert!(matches!(resolution, Resolution::NotFound));
        assert_eq!(remote.employee_calls(), 1);
        assert_eq!(local.creates(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_master_data_is_sync_failure() {
        let remote = StubMasterData::new();
        remote.serve_employee("1023829A", john_doe()).await;
        remote.set_unavailable(true);
        let local = CountingEmployeeRepository::new();
        let sync = EmployeeSync::new(local.clone(), remote.clone());

        let resolution = sync.resolve("1023829A").await.unwrap();

        assert!(matches!(
            resolution,
            Resolution::SyncFailed(RemoteError::Transport { .. })
        ));
        assert!(local.inner.is_empty().await);

        remote.set_unavailable(false);
        assert_eq!(sync.resolve("1023829A").await.unwrap().path(), "synced");
    }

    #[tokio::test]
    async fn test_key_mismatch_is_rejected() {
        let remote = StubMasterData::new();
        remote.serve_employee("5550001B", john_doe()).await;
        let local = CountingEmployeeRepository::new();
        let sync = EmployeeSync::new(local.clone(), remote.clone());

        let resolution = sync.resolve("5550001B").await.unwrap();

        match resolution {
            Resolution::SyncFailed(RemoteError::KeyMismatch { requested, returned }) => {
                assert_eq!(requested, "5550001B");
                assert_eq!(returned, "1023829A");
            }
            other => panic!("unexpected resolution: {other:?}"),
        }
        assert_eq!(local.creates(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_insert_resolves_to_existing_record() {
        let mut winner = john_doe().into_local(timestamp_now());
        winner.id = "e1-winner".to_string();
        let local = RacingEmployeeRepository::with_winner(&winner).await;
        let remote = StubMasterData::new();
        remote.serve_employee("1023829A", john_doe()).await;
        let sync = EmployeeSync::new(local, remote.clone());

        let resolution = sync.resolve("1023829A").await.unwrap();

        assert_eq!(resolution.path(), "synced");
        assert_eq!(resolution.into_employee().unwrap().id, "e1-winner");
        assert_eq!(remote.employee_calls(), 1);
    }

    #[tokio::test]
    async fn test_local_store_failure_propagates() {
        let remote = StubMasterData::new();
        remote.serve_employee("1023829A", john_doe()).await;
        let sync = EmployeeSync::new(Arc::new(UnavailableEmployeeRepository), remote.clone());

        assert_err!(sync.resolve("1023829A").await);
        assert_eq!(remote.employee_calls(), 0);
    }
}
