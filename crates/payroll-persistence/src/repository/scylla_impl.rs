//! ScyllaDB repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use scylla::frame::response::result::Row;
use scylla::{QueryResult, Session, SessionBuilder};
use std::fmt::Display;
use std::sync::Arc;

use super::traits::{ContributionRepository, EmployeeRepository, EmployerRepository};
use crate::error::{PersistenceError, Result};
use payroll_domain::{Contribution, ContributionFilter, Employee, Employer};

// =============================================================================
// SCYLLA CONFIGURATION
// =============================================================================

/// ScyllaDB connection configuration.
#[derive(Debug, Clone)]
pub struct ScyllaConfig {
    pub hosts: Vec<String>,
    pub keyspace: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub replication_factor: u32,
}

impl Default for ScyllaConfig {
    fn default() -> Self {
        Self {
            hosts: vec!["localhost:9042".to_string()],
            keyspace: "payroll".to_string(),
            username: None,
            password: None,
            replication_factor: 1,
        }
    }
}

// =============================================================================
// SCYLLA CLIENT
// =============================================================================

/// ScyllaDB client wrapper.
pub struct ScyllaClient {
    session: Arc<Session>,
    pub config: ScyllaConfig,
}

impl ScyllaClient {
    /// Connect, bootstrap the schema and switch to the configured keyspace.
    ///
    /// # Errors
    ///
    /// Returns an error if the keyspace name is not a plain identifier or
    /// the cluster cannot be reached.
    pub async fn new(config: ScyllaConfig) -> Result<Self> {
        if config.keyspace.is_empty()
            || !config
                .keyspace
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            return Err(PersistenceError::InvalidConfig(format!(
                "keyspace '{}' must be alphanumeric",
                config.keyspace
            )));
        }

        let mut builder = SessionBuilder::new().known_nodes(&config.hosts);

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.user(user, pass);
        }

        let session = builder.build().await?;
        let client = Self {
            session: Arc::new(session),
            config,
        };

        client.ensure_schema().await?;
        client
            .session
            .use_keyspace(client.config.keyspace.as_str(), false)
            .await?;

        Ok(client)
    }

    /// Create keyspace, tables and indexes when missing.
    ///
    /// # Errors
    ///
    /// Propagates any failing DDL statement.
    pub async fn ensure_schema(&self) -> Result<()> {
        let ks = &self.config.keyspace;
        let statements = [
            format!(
                "CREATE KEYSPACE IF NOT EXISTS {ks} WITH replication = \
                 {{'class': 'SimpleStrategy', 'replication_factor': {}}}",
                self.config.replication_factor
            ),
            format!(
                "CREATE TABLE IF NOT EXISTS {ks}.employees (
                    rssb_number text PRIMARY KEY,
                    id text,
                    firstname text,
                    lastname text,
                    dob date,
                    created_at timestamp,
                    updated_at timestamp
                )"
            ),
            format!(
                "CREATE TABLE IF NOT EXISTS {ks}.employers (
                    matricule text PRIMARY KEY,
                    id text,
                    name text,
                    created_at timestamp,
                    updated_at timestamp
                )"
            ),
            format!(
                "CREATE TABLE IF NOT EXISTS {ks}.contributions (
                    id text PRIMARY KEY,
                    period text,
                    rssb_number text,
                    matricule text,
                    amount text,
                    created_at timestamp,
                    updated_at timestamp
                )"
            ),
            format!(
                "CREATE INDEX IF NOT EXISTS contributions_rssb_number_idx \
                 ON {ks}.contributions (rssb_number)"
            ),
            format!("CREATE INDEX IF NOT EXISTS contributions_period_idx ON {ks}.contributions (period)"),
            format!(
                "CREATE INDEX IF NOT EXISTS contributions_matricule_idx \
                 ON {ks}.contributions (matricule)"
            ),
        ];

        for statement in statements {
            self.session.query_unpaged(statement, ()).await?;
        }

        tracing::debug!(keyspace = %ks, "ScyllaDB schema ready");
        Ok(())
    }
}

// =============================================================================
// ROW MAPPING
// =============================================================================

type EmployeeRow = (String, String, String, String, NaiveDate, DateTime<Utc>, DateTime<Utc>);
type EmployerRow = (String, String, String, DateTime<Utc>, DateTime<Utc>);
type ContributionRow = (String, String, String, String, String, DateTime<Utc>, DateTime<Utc>);

const EMPLOYEE_COLUMNS: &str = "id, firstname, lastname, rssb_number, dob, created_at, updated_at";
const EMPLOYER_COLUMNS: &str = "id, name, matricule, created_at, updated_at";
const CONTRIBUTION_COLUMNS: &str =
    "id, period, rssb_number, matricule, amount, created_at, updated_at";

fn employee_from_row(row: EmployeeRow) -> Employee {
    let (id, firstname, lastname, rssb_number, dob, created_at, updated_at) = row;
    Employee {
        id,
        firstname,
        lastname,
        rssb_number,
        dob,
        created_at,
        updated_at,
    }
}

fn employer_from_row(row: EmployerRow) -> Employer {
    let (id, name, matricule, created_at, updated_at) = row;
    Employer {
        id,
        name,
        matricule,
        created_at,
        updated_at,
    }
}

fn contribution_from_row(row: ContributionRow) -> Result<Contribution> {
    let (id, period, rssb_number, matricule, amount, created_at, updated_at) = row;
    Ok(Contribution {
        id,
        period: period.parse()?,
        rssb_number,
        matricule,
        amount: amount.parse()?,
        created_at,
        updated_at,
    })
}

fn scylla_err(err: impl Display) -> PersistenceError {
    PersistenceError::Scylla(err.to_string())
}

/// Read the `[applied]` flag of a lightweight transaction.
fn lwt_applied(result: QueryResult) -> Result<bool> {
    let rows = result.into_rows_result().map_err(scylla_err)?;
    let row = rows.maybe_first_row::<Row>().map_err(scylla_err)?;

    Ok(row
        .and_then(|r| r.columns.into_iter().next().flatten())
        .and_then(|v| v.as_boolean())
        .unwrap_or(false))
}

// =============================================================================
// EMPLOYEE REPOSITORY
// =============================================================================

/// Employees partitioned by RSSB number.
pub struct ScyllaEmployeeRepository {
    client: Arc<ScyllaClient>,
}

impl ScyllaEmployeeRepository {
    /// Create a new employee repository.
    pub const fn new(client: Arc<ScyllaClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EmployeeRepository for ScyllaEmployeeRepository {
    async fn find_all(&self) -> Result<Vec<Employee>> {
        let query = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees");

        let result = self.client.session.query_unpaged(query, ()).await?;
        let rows = result.into_rows_result().map_err(scylla_err)?;

        let mut employees = rows
            .rows::<EmployeeRow>()
            .map_err(scylla_err)?
            .map(|row| row.map(employee_from_row).map_err(scylla_err))
            .collect::<Result<Vec<_>>>()?;

        Employee::sort_newest_first(&mut employees);
        Ok(employees)
    }

    async fn find_by_rssb_number(&self, rssb_number: &str) -> Result<Option<Employee>> {
        let query = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE rssb_number = ?");

        let result = self
            .client
            .session
            .query_unpaged(query, (rssb_number,))
            .await?;
        let rows = result.into_rows_result().map_err(scylla_err)?;

        Ok(rows
            .maybe_first_row::<EmployeeRow>()
            .map_err(scylla_err)?
            .map(employee_from_row))
    }

    async fn create(&self, employee: &Employee) -> Result<Employee> {
        let query = r"
            INSERT INTO employees (
                rssb_number, id, firstname, lastname, dob, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            IF NOT EXISTS
        ";

        let result = self
            .client
            .session
            .query_unpaged(
                query,
                (
                    &employee.rssb_number,
                    &employee.id,
                    &employee.firstname,
                    &employee.lastname,
                    employee.dob,
                    employee.created_at,
                    employee.updated_at,
                ),
            )
            .await?;

        if !lwt_applied(result)? {
            return Err(PersistenceError::conflict("employee", &employee.rssb_number));
        }

        Ok(employee.clone())
    }
}

// =============================================================================
// EMPLOYER REPOSITORY
// =============================================================================

/// Employers partitioned by matricule.
pub struct ScyllaEmployerRepository {
    client: Arc<ScyllaClient>,
}

impl ScyllaEmployerRepository {
    /// Create a new employer repository.
    pub const fn new(client: Arc<ScyllaClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EmployerRepository for ScyllaEmployerRepository {
    async fn find_all(&self) -> Result<Vec<Employer>> {
        let query = format!("SELECT {EMPLOYER_COLUMNS} FROM employers");

        let result = self.client.session.query_unpaged(query, ()).await?;
        let rows = result.into_rows_result().map_err(scylla_err)?;

        let mut employers = rows
            .rows::<EmployerRow>()
            .map_err(scylla_err)?
            .map(|row| row.map(employer_from_row).map_err(scylla_err))
            .collect::<Result<Vec<_>>>()?;

        Employer::sort_newest_first(&mut employers);
        Ok(employers)
    }

    async fn find_by_matricule(&self, matricule: &str) -> Result<Option<Employer>> {
        let query = format!("SELECT {EMPLOYER_COLUMNS} FROM employers WHERE matricule = ?");

        let result = self
            .client
            .session
            .query_unpaged(query, (matricule,))
            .await?;
        let rows = result.into_rows_result().map_err(scylla_err)?;

        Ok(rows
            .maybe_first_row::<EmployerRow>()
            .map_err(scylla_err)?
            .map(employer_from_row))
    }

    async fn create(&self, employer: &Employer) -> Result<Employer> {
        let query = r"
            INSERT INTO employers (matricule, id, name, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            IF NOT EXISTS
        ";

        let result = self
            .client
            .session
            .query_unpaged(
                query,
                (
                    &employer.matricule,
                    &employer.id,
                    &employer.name,
                    employer.created_at,
                    employer.updated_at,
                ),
            )
            .await?;

        if !lwt_applied(result)? {
            return Err(PersistenceError::conflict("employer", &employer.matricule));
        }

        Ok(employer.clone())
    }
}

// =============================================================================
// CONTRIBUTION REPOSITORY
// =============================================================================

/// Contributions keyed by id, secondary-indexed by each filter column.
pub struct ScyllaContributionRepository {
    client: Arc<ScyllaClient>,
}

impl ScyllaContributionRepository {
    /// Create a new contribution repository.
    pub const fn new(client: Arc<ScyllaClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ContributionRepository for ScyllaContributionRepository {
    async fn find(&self, filter: &ContributionFilter) -> Result<Vec<Contribution>> {
        let select = format!("SELECT {CONTRIBUTION_COLUMNS} FROM contributions");
        let session = &self.client.session;

        let result = match filter {
            ContributionFilter::All => session.query_unpaged(select, ()).await?,
            ContributionFilter::ByRssbNumber(rssb_number) => {
                session
                    .query_unpaged(format!("{select} WHERE rssb_number = ?"), (rssb_number,))
                    .await?
            }
            ContributionFilter::ByPeriod(period) => {
                session
                    .query_unpaged(format!("{select} WHERE period = ?"), (period.to_string(),))
                    .await?
            }
            ContributionFilter::ByMatricule(matricule) => {
                session
                    .query_unpaged(format!("{select} WHERE matricule = ?"), (matricule,))
                    .await?
            }
        };
        let rows = result.into_rows_result().map_err(scylla_err)?;

        let mut contributions = rows
            .rows::<ContributionRow>()
            .map_err(scylla_err)?
            .map(|row| row.map_err(scylla_err).and_then(contribution_from_row))
            .collect::<Result<Vec<_>>>()?;

        Contribution::sort_for_listing(&mut contributions);
        Ok(contributions)
    }

    async fn create(&self, contribution: &Contribution) -> Result<Contribution> {
        let query = r"
            INSERT INTO contributions (
                id, period, rssb_number, matricule, amount, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
        ";

        self.client
            .session
            .query_unpaged(
                query,
                (
                    &contribution.id,
                    contribution.period.to_string(),
                    &contribution.rssb_number,
                    &contribution.matricule,
                    contribution.amount.to_string(),
                    contribution.created_at,
                    contribution.updated_at,
                ),
            )
            .await?;

        Ok(contribution.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_contribution_row_mapping() {
        let row: ContributionRow = (
            "c1".to_string(),
            "2025-02".to_string(),
            "1023829A".to_string(),
            "3100000000A".to_string(),
            "4000000.50".to_string(),
            ts("2025-03-01T00:00:00Z"),
            ts("2025-03-01T00:00:00Z"),
        );

        let contribution = contribution_from_row(row).unwrap();
        assert_eq!(contribution.period.to_string(), "2025-02");
        assert_eq!(contribution.amount.minor_units(), 400_000_050);
    }

    #[test]
    fn test_corrupt_amount_is_serialization_error() {
        let row: ContributionRow = (
            "c1".to_string(),
            "2025-02".to_string(),
            "1023829A".to_string(),
            "3100000000A".to_string(),
            "not-a-number".to_string(),
            ts("2025-03-01T00:00:00Z"),
            ts("2025-03-01T00:00:00Z"),
        );

        assert!(matches!(
            contribution_from_row(row),
            Err(PersistenceError::Serialization(_))
        ));
    }

    #[test]
    fn test_employee_row_mapping() {
        let row: EmployeeRow = (
            "e1".to_string(),
            "John".to_string(),
            "Doe".to_string(),
            "1023829A".to_string(),
            NaiveDate::from_ymd_opt(1990, 1, 15).unwrap(),
            ts("2025-01-01T10:00:00Z"),
            ts("2025-01-01T10:00:00Z"),
        );

        let employee = employee_from_row(row);
        assert_eq!(employee.id, "e1");
        assert_eq!(employee.rssb_number, "1023829A");
    }
}
