//! # Repository Traits
//!
//! Abstract master store interfaces for payroll entities.
//! Implementations can be swapped for different backends (ScyllaDB, in-memory, etc.)

use async_trait::async_trait;

use crate::error::Result;
use payroll_domain::{Contribution, ContributionFilter, Employee, Employer};

// =============================================================================
// EMPLOYEE REPOSITORY
// =============================================================================

/// Repository for Employee entity operations
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Get all employees, newest first
    async fn find_all(&self) -> Result<Vec<Employee>>;

    /// Get employee by RSSB number
    async fn find_by_rssb_number(&self, rssb_number: &str) -> Result<Option<Employee>>;

    /// Persist a new employee.
    ///
    /// Fails with `PersistenceError::Conflict` when the RSSB number is taken.
    async fn create(&self, employee: &Employee) -> Result<Employee>;
}

// =============================================================================
// EMPLOYER REPOSITORY
// =============================================================================

/// Repository for Employer entity operations
#[async_trait]
pub trait EmployerRepository: Send + Sync {
    /// Get all employers, newest first
    async fn find_all(&self) -> Result<Vec<Employer>>;

    /// Get employer by matricule
    async fn find_by_matricule(&self, matricule: &str) -> Result<Option<Employer>>;

    /// Persist a new employer.
    ///
    /// Fails with `PersistenceError::Conflict` when the matricule is taken.
    async fn create(&self, employer: &Employer) -> Result<Employer>;
}

// =============================================================================
// CONTRIBUTION REPOSITORY
// =============================================================================

/// Repository for Contribution entity operations
#[async_trait]
pub trait ContributionRepository: Send + Sync {
    /// Get contributions matching the filter, by period then creation time, newest first
    async fn find(&self, filter: &ContributionFilter) -> Result<Vec<Contribution>>;

    /// Persist a new contribution
    async fn create(&self, contribution: &Contribution) -> Result<Contribution>;
}
