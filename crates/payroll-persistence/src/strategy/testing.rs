//! Test doubles for the master data client, store and cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use tokio::sync::Mutex;

use crate::cache::CacheStore;
use crate::error::{PersistenceError, Result};
use crate::remote::{MasterDataClient, RemoteEmployee, RemoteError};
use crate::repository::{EmployeeRepository, InMemoryEmployeeRepository};
use payroll_domain::{Amount, Contribution, Employee, Period};

pub fn john_doe() -> RemoteEmployee {
    RemoteEmployee {
        id: "e1".to_string(),
        firstname: "John".to_string(),
        lastname: "Doe".to_string(),
        rssb_number: "1023829A".to_string(),
        dob: NaiveDate::from_ymd_opt(1990, 1, 15).unwrap(),
        created_at: None,
        updated_at: None,
    }
}

pub fn contribution(id: &str, rssb_number: &str, year: u16, month: u8, amount: &str) -> Contribution {
    let created_at = Utc
        .with_ymd_and_hms(i32::from(year), u32::from(month), 28, 12, 0, 0)
        .unwrap();
    Contribution {
        id: id.to_string(),
        period: Period::new(year, month).unwrap(),
        rssb_number: rssb_number.to_string(),
        matricule: "3100000000A".to_string(),
        amount: amount.parse::<Amount>().unwrap(),
        created_at,
        updated_at: created_at,
    }
}

// =============================================================================
// MASTER DATA
// =============================================================================

/// Scripted master data API that counts calls
#[derive(Default)]
pub struct StubMasterData {
    employees: Mutex<HashMap<String, RemoteEmployee>>,
    contributions: Mutex<HashMap<String, Vec<Contribution>>>,
    unavailable: AtomicBool,
    employee_calls: AtomicUsize,
    contribution_calls: AtomicUsize,
}

impl StubMasterData {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Serve `employee` for `requested`, whatever its own RSSB number
    pub async fn serve_employee(&self, requested: &str, employee: RemoteEmployee) {
        self.employees.lock().await.insert(requested.to_string(), employee);
    }

    pub async fn serve_contributions(&self, rssb_number: &str, contributions: Vec<Contribution>) {
        self.contributions
            .lock()
            .await
            .insert(rssb_number.to_string(), contributions);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn employee_calls(&self) -> usize {
        self.employee_calls.load(Ordering::SeqCst)
    }

    pub fn contribution_calls(&self) -> usize {
        self.contribution_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self, url: &str) -> std::result::Result<(), RemoteError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RemoteError::Transport {
                url: url.to_string(),
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MasterDataClient for StubMasterData {
    async fn get_employee(&self, rssb_number: &str) -> std::result::Result<RemoteEmployee, RemoteError> {
        self.employee_calls.fetch_add(1, Ordering::SeqCst);
        let url = format!("stub://employees/{rssb_number}");
        self.check_available(&url)?;

        self.employees
            .lock()
            .await
            .get(rssb_number)
            .cloned()
            .ok_or(RemoteError::Status { url, status: 404 })
    }

    async fn get_contributions(
        &self,
        rssb_number: &str,
    ) -> std::result::Result<Vec<Contribution>, RemoteError> {
        self.contribution_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available("stub://contributions")?;

        Ok(self
            .contributions
            .lock()
            .await
            .get(rssb_number)
            .cloned()
            .unwrap_or_default())
    }
}

// =============================================================================
// STORES
// =============================================================================

/// In-memory employee store that counts creates
#[derive(Default)]
pub struct CountingEmployeeRepository {
    pub inner: InMemoryEmployeeRepository,
    creates: AtomicUsize,
}

impl CountingEmployeeRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmployeeRepository for CountingEmployeeRepository {
    async fn find_all(&self) -> Result<Vec<Employee>> {
        self.inner.find_all().await
    }

    async fn find_by_rssb_number(&self, rssb_number: &str) -> Result<Option<Employee>> {
        self.inner.find_by_rssb_number(rssb_number).await
    }

    async fn create(&self, employee: &Employee) -> Result<Employee> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create(employee).await
    }
}

/// Store where a concurrent writer lands between the first lookup and the insert
pub struct RacingEmployeeRepository {
    inner: InMemoryEmployeeRepository,
    first_lookup_done: AtomicBool,
}

impl RacingEmployeeRepository {
    pub async fn with_winner(winner: &Employee) -> Arc<Self> {
        let inner = InMemoryEmployeeRepository::new();
        inner.create(winner).await.unwrap();
        Arc::new(Self {
            inner,
            first_lookup_done: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl EmployeeRepository for RacingEmployeeRepository {
    async fn find_all(&self) -> Result<Vec<Employee>> {
        self.inner.find_all().await
    }

    async fn find_by_rssb_number(&self, rssb_number: &str) -> Result<Option<Employee>> {
        if self.first_lookup_done.swap(true, Ordering::SeqCst) {
            self.inner.find_by_rssb_number(rssb_number).await
        } else {
            Ok(None)
        }
    }

    async fn create(&self, employee: &Employee) -> Result<Employee> {
        self.inner.create(employee).await
    }
}

/// Store whose every call fails
pub struct UnavailableEmployeeRepository;

#[async_trait]
impl EmployeeRepository for UnavailableEmployeeRepository {
    async fn find_all(&self) -> Result<Vec<Employee>> {
        Err(PersistenceError::Scylla("no hosts available".to_string()))
    }

    async fn find_by_rssb_number(&self, _rssb_number: &str) -> Result<Option<Employee>> {
        Err(PersistenceError::Scylla("no hosts available".to_string()))
    }

    async fn create(&self, _employee: &Employee) -> Result<Employee> {
        Err(PersistenceError::Scylla("no hosts available".to_string()))
    }
}

// =============================================================================
// CACHE
// =============================================================================

/// Cache whose every call fails
pub struct UnavailableCache;

#[async_trait]
impl CacheStore for UnavailableCache {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(PersistenceError::Redis("connection reset".to_string()))
    }

    async fn set_with_ttl(&self, _key: &str, _value: String, _ttl: Duration) -> Result<()> {
        Err(PersistenceError::Redis("connection reset".to_string()))
    }

    async fn count_keys(&self, _pattern: &str) -> Result<usize> {
        Err(PersistenceError::Redis("connection reset".to_string()))
    }
}
