//! In-memory repositories for development and testing.
//!
//! Records live in maps wrapped in `Arc<RwLock<_>>` and are lost when the
//! last handle is dropped. Business keys are unique exactly as in the
//! ScyllaDB backend.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::traits::{ContributionRepository, EmployeeRepository, EmployerRepository};
use crate::error::{PersistenceError, Result};
use payroll_domain::{Contribution, ContributionFilter, Employee, Employer};

/// Employees keyed by RSSB number
#[derive(Debug, Clone, Default)]
pub struct InMemoryEmployeeRepository {
    employees: Arc<RwLock<HashMap<String, Employee>>>,
}

impl InMemoryEmployeeRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored employees
    pub async fn len(&self) -> usize {
        self.employees.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.employees.read().await.is_empty()
    }
}

#[async_trait]
impl EmployeeRepository for InMemoryEmployeeRepository {
    async fn find_all(&self) -> Result<Vec<Employee>> {
        let mut employees: Vec<Employee> = self.employees.read().await.values().cloned().collect();
        Employee::sort_newest_first(&mut employees);
        Ok(employees)
    }

    async fn find_by_rssb_number(&self, rssb_number: &str) -> Result<Option<Employee>> {
        Ok(self.employees.read().await.get(rssb_number).cloned())
    }

    async fn create(&self, employee: &Employee) -> Result<Employee> {
        let mut employees = self.employees.write().await;
        match employees.entry(employee.rssb_number.clone()) {
            Entry::Occupied(_) => Err(PersistenceError::conflict("employee", &employee.rssb_number)),
            Entry::Vacant(slot) => Ok(slot.insert(employee.clone()).clone()),
        }
    }
}

/// Employers keyed by matricule
#[derive(Debug, Clone, Default)]
pub struct InMemoryEmployerRepository {
    employers: Arc<RwLock<HashMap<String, Employer>>>,
}

impl InMemoryEmployerRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmployerRepository for InMemoryEmployerRepository {
    async fn find_all(&self) -> Result<Vec<Employer>> {
        let mut employers: Vec<Employer> = self.employers.read().await.values().cloned().collect();
        Employer::sort_newest_first(&mut employers);
        Ok(employers)
    }

    async fn find_by_matricule(&self, matricule: &str) -> Result<Option<Employer>> {
        Ok(self.employers.read().await.get(matricule).cloned())
    }

    async fn create(&self, employer: &Employer) -> Result<Employer> {
        let mut employers = self.employers.write().await;
        match employers.entry(employer.matricule.clone()) {
            Entry::Occupied(_) => Err(PersistenceError::conflict("employer", &employer.matricule)),
            Entry::Vacant(slot) => Ok(slot.insert(employer.clone()).clone()),
        }
    }
}

/// Contributions in insertion order; no uniqueness beyond the record id
#[derive(Debug, Clone, Default)]
pub struct InMemoryContributionRepository {
    contributions: Arc<RwLock<Vec<Contribution>>>,
}

impl InMemoryContributionRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContributionRepository for InMemoryContributionRepository {
    async fn find(&self, filter: &ContributionFilter) -> Result<Vec<Contribution>> {
        let mut matching: Vec<Contribution> = self
            .contributions
            .read()
            .await
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        Contribution::sort_for_listing(&mut matching);
        Ok(matching)
    }

    async fn create(&self, contribution: &Contribution) -> Result<Contribution> {
        let mut contributions = self.contributions.write().await;
        if contributions.iter().any(|c| c.id == contribution.id) {
            return Err(PersistenceError::conflict("contribution", &contribution.id));
        }
        contributions.push(contribution.clone());
        Ok(contribution.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use fake::Fake;
    use fake::faker::name::en::{FirstName, LastName};
    use payroll_domain::{NewContribution, NewEmployee, timestamp_now};

    fn employee(rssb_number: &str) -> Employee {
        NewEmployee {
            firstname: FirstName().fake(),
            lastname: LastName().fake(),
            rssb_number: rssb_number.to_string(),
            dob: NaiveDate::from_ymd_opt(1990, 1, 15).unwrap(),
        }
        .into_employee(timestamp_now())
    }

    fn contribution(rssb_number: &str, period: &str, matricule: &str) -> Contribution {
        NewContribution {
            period: period.parse().unwrap(),
            rssb_number: rssb_number.to_string(),
            matricule: matricule.to_string(),
            amount: "1500.00".parse().unwrap(),
        }
        .into_contribution(timestamp_now())
    }

    #[tokio::test]
    async fn test_employee_create_and_find() {
        let repo = InMemoryEmployeeRepository::new();
        let created = repo.create(&employee("1023829A")).await.unwrap();

        let found = repo.find_by_rssb_number("1023829A").await.unwrap();
        assert_eq!(found, Some(created));
        assert_eq!(repo.find_by_rssb_number("0000000X").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_employee_duplicate_key_conflicts() {
        let repo = InMemoryEmployeeRepository::new();
        repo.create(&employee("1023829A")).await.unwrap();

        let err = repo.create(&employee("1023829A")).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_employees_newest_first() {
        let repo = InMemoryEmployeeRepository::new();
        let mut older = employee("1000000A");
        older.created_at -= Duration::hours(1);
        repo.create(&older).await.unwrap();
        repo.create(&employee("2000000B")).await.unwrap();

        let keys: Vec<String> = repo
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.rssb_number)
            .collect();
        assert_eq!(keys, vec!["2000000B", "1000000A"]);
    }

    #[tokio::test]
    async fn test_contribution_filters() {
        let repo = InMemoryContributionRepository::new();
        repo.create(&contribution("1023829A", "2025-01", "3100000000A")).await.unwrap();
        repo.create(&contribution("1023829A", "2025-02", "3100000000B")).await.unwrap();
        repo.create(&contribution("2000000B", "2025-01", "3100000000A")).await.unwrap();
        // Same tuple twice is allowed.
        repo.create(&contribution("2000000B", "2025-01", "3100000000A")).await.unwrap();

        let by_employee = repo
            .find(&ContributionFilter::ByRssbNumber("1023829A".to_string()))
            .await
            .unwrap();
        let periods: Vec<String> = by_employee.iter().map(|c| c.period.to_string()).collect();
        assert_eq!(periods, vec!["2025-02", "2025-01"]);

        let by_period = repo
            .find(&ContributionFilter::ByPeriod("2025-01".parse().unwrap()))
            .await
            .unwrap();
        assert_eq!(by_period.len(), 3);

        let by_employer = repo
            .find(&ContributionFilter::ByMatricule("3100000000B".to_string()))
            .await
            .unwrap();
        assert_eq!(by_employer.len(), 1);

        assert_eq!(repo.find(&ContributionFilter::All).await.unwrap().len(), 4);
    }
}
