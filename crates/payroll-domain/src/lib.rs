//! # Payroll Contribution Master Data - Domain Model
//!
//! Core entities, value objects, and create inputs for payroll contribution
//! master data. These types are shared by the persistence layer, the
//! authoritative oracle service and the downstream imisanzu service.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Maximum length of a business key (RSSB number, matricule)
pub const MAX_KEY_LEN: usize = 50;

/// Maximum length of a person or company name
pub const MAX_NAME_LEN: usize = 255;

/// Generate a new opaque record id
#[must_use]
pub fn new_record_id() -> String {
    Uuid::now_v7().to_string()
}

/// Current time at millisecond precision, the resolution stores keep
#[must_use]
pub fn timestamp_now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

// =============================================================================
// VALUE OBJECTS
// =============================================================================

/// Calendar month a contribution applies to, written `YYYY-MM`.
///
/// Ordering is chronological, which matches the lexical order of the
/// canonical string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: u16,
    month: u8,
}

impl Period {
    /// Build a period from its parts
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPeriod` when the month is outside 1..=12.
    pub fn new(year: u16, month: u8) -> Result<Self, DomainError> {
        if !(1..=12).contains(&month) || year > 9999 {
            return Err(DomainError::InvalidPeriod(format!("{year:04}-{month:02}")));
        }
        Ok(Self { year, month })
    }

    #[must_use]
    pub const fn year(&self) -> u16 {
        self.year
    }

    #[must_use]
    pub const fn month(&self) -> u8 {
        self.month
    }
}

impl FromStr for Period {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidPeriod(s.to_string());

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4
            || month.len() != 2
            || !year.bytes().all(|b| b.is_ascii_digit())
            || !month.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let year: u16 = year.parse().map_err(|_| invalid())?;
        let month: u8 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl TryFrom<String> for Period {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

/// Monetary amount with two fractional digits, held as integer minor units.
///
/// Mirrors a `decimal(12,2)` column: parsing never goes through binary
/// floating point arithmetic, and the canonical text form always carries
/// two fractional digits (`"4000000.00"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    minor_units: i64,
}

impl Amount {
    /// Largest amount a `decimal(12,2)` column can hold
    pub const MAX: Self = Self { minor_units: 999_999_999_999 };

    const MINOR_PER_UNIT: i64 = 100;

    #[must_use]
    pub const fn from_minor_units(minor_units: i64) -> Self {
        Self { minor_units }
    }

    #[must_use]
    pub const fn minor_units(self) -> i64 {
        self.minor_units
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.minor_units < 0
    }
}

impl FromStr for Amount {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidAmount(s.to_string());
        let trimmed = s.trim();

        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));

        // Extra fractional digits are only accepted when they carry no value.
        let (frac_kept, frac_rest) = frac_part.split_at(frac_part.len().min(2));
        if int_part.is_empty()
            || int_part.len() > 16
            || !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
            || frac_rest.bytes().any(|b| b != b'0')
        {
            return Err(invalid());
        }

        let units: i64 = int_part.parse().map_err(|_| invalid())?;
        let cents: i64 = format!("{frac_kept:0<2}").parse().map_err(|_| invalid())?;

        let magnitude = units
            .checked_mul(Self::MINOR_PER_UNIT)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(invalid)?;

        Ok(Self::from_minor_units(if negative { -magnitude } else { magnitude }))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = self.minor_units.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl serde::de::Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal amount as a string or number")
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Amount, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Amount, E> {
        v.checked_mul(Amount::MINOR_PER_UNIT)
            .map(Amount::from_minor_units)
            .ok_or_else(|| E::custom(DomainError::InvalidAmount(v.to_string())))
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Amount, E> {
        let v = i64::try_from(v)
            .map_err(|_| E::custom(DomainError::InvalidAmount(v.to_string())))?;
        self.visit_i64(v)
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Amount, E> {
        if !v.is_finite() {
            return Err(E::custom(DomainError::InvalidAmount(v.to_string())));
        }
        // Shortest round-trip decimal form, then exact decimal parsing.
        self.visit_str(&v.to_string())
    }
}

// =============================================================================
// ENTITIES
// =============================================================================

/// Employee master record, keyed by RSSB number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub rssb_number: String,
    #[serde(with = "dob_format")]
    pub dob: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    /// Newest records first
    pub fn sort_newest_first(employees: &mut [Self]) {
        employees.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
}

/// Employer master record, keyed by matricule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employer {
    pub id: String,
    pub name: String,
    pub matricule: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employer {
    /// Newest records first
    pub fn sort_newest_first(employers: &mut [Self]) {
        employers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
}

/// Contribution paid for one employee by one employer for a period.
///
/// `rssb_number` and `matricule` are loose references: no existence check
/// is made against employees or employers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    pub id: String,
    pub period: Period,
    pub rssb_number: String,
    pub matricule: String,
    pub amount: Amount,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contribution {
    /// Listing order: period descending, then creation time descending
    #[must_use]
    pub fn listing_order(a: &Self, b: &Self) -> Ordering {
        b.period
            .cmp(&a.period)
            .then_with(|| b.created_at.cmp(&a.created_at))
    }

    pub fn sort_for_listing(contributions: &mut [Self]) {
        contributions.sort_by(Self::listing_order);
    }
}

// =============================================================================
// CREATE INPUTS
// =============================================================================

/// Input for creating an employee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub firstname: String,
    pub lastname: String,
    pub rssb_number: String,
    #[serde(with = "dob_format")]
    pub dob: NaiveDate,
}

impl NewEmployee {
    /// # Errors
    ///
    /// Returns `DomainError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_name("firstname", &self.firstname)?;
        validate_name("lastname", &self.lastname)?;
        validate_business_key("rssbNumber", &self.rssb_number)
    }

    #[must_use]
    pub fn into_employee(self, now: DateTime<Utc>) -> Employee {
        Employee {
            id: new_record_id(),
            firstname: self.firstname.trim().to_string(),
            lastname: self.lastname.trim().to_string(),
            rssb_number: self.rssb_number,
            dob: self.dob,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating an employer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployer {
    pub name: String,
    pub matricule: String,
}

impl NewEmployer {
    /// # Errors
    ///
    /// Returns `DomainError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_name("name", &self.name)?;
        validate_business_key("matricule", &self.matricule)
    }

    #[must_use]
    pub fn into_employer(self, now: DateTime<Utc>) -> Employer {
        Employer {
            id: new_record_id(),
            name: self.name.trim().to_string(),
            matricule: self.matricule,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating a contribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContribution {
    pub period: Period,
    pub rssb_number: String,
    pub matricule: String,
    pub amount: Amount,
}

impl NewContribution {
    /// # Errors
    ///
    /// Returns `DomainError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_business_key("rssbNumber", &self.rssb_number)?;
        validate_business_key("matricule", &self.matricule)?;

        if self.amount.is_negative() {
            return Err(DomainError::validation("amount", "must not be negative"));
        }
        if self.amount > Amount::MAX {
            return Err(DomainError::validation("amount", "exceeds 10 integer digits"));
        }
        Ok(())
    }

    #[must_use]
    pub fn into_contribution(self, now: DateTime<Utc>) -> Contribution {
        Contribution {
            id: new_record_id(),
            period: self.period,
            rssb_number: self.rssb_number,
            matricule: self.matricule,
            amount: self.amount,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Validate an RSSB number or matricule: 1-50 ASCII alphanumeric characters
///
/// # Errors
///
/// Returns `DomainError::Validation` for the given field.
pub fn validate_business_key(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    if value.len() > MAX_KEY_LEN {
        return Err(DomainError::validation(field, "must be at most 50 characters"));
    }
    if !value.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(DomainError::validation(field, "must be ASCII alphanumeric"));
    }
    Ok(())
}

fn validate_name(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(field, "must not be blank"));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(field, "must be at most 255 characters"));
    }
    Ok(())
}

// =============================================================================
// QUERY/FILTER TYPES
// =============================================================================

/// Contribution listing filter. At most one criterion applies.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContributionFilter {
    #[default]
    All,
    ByRssbNumber(String),
    ByPeriod(Period),
    ByMatricule(String),
}

impl ContributionFilter {
    /// Build a filter from optional query parameters.
    ///
    /// When several are supplied, precedence is rssbNumber, then period,
    /// then matricule. Empty strings count as absent.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPeriod` for a malformed period.
    pub fn from_params(
        rssb_number: Option<String>,
        period: Option<String>,
        matricule: Option<String>,
    ) -> Result<Self, DomainError> {
        let present = |v: Option<String>| v.filter(|s| !s.is_empty());

        if let Some(rssb_number) = present(rssb_number) {
            return Ok(Self::ByRssbNumber(rssb_number));
        }
        if let Some(period) = present(period) {
            return Ok(Self::ByPeriod(period.parse()?));
        }
        if let Some(matricule) = present(matricule) {
            return Ok(Self::ByMatricule(matricule));
        }
        Ok(Self::All)
    }

    #[must_use]
    pub fn matches(&self, contribution: &Contribution) -> bool {
        match self {
            Self::All => true,
            Self::ByRssbNumber(rssb) => contribution.rssb_number == *rssb,
            Self::ByPeriod(period) => contribution.period == *period,
            Self::ByMatricule(matricule) => contribution.matricule == *matricule,
        }
    }
}

// =============================================================================
// SERDE HELPERS
// =============================================================================

/// Date of birth: emitted as `YYYY-MM-DD`, accepted as a plain date or an
/// RFC 3339 timestamp (taken in UTC).
pub mod dob_format {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    /// # Errors
    ///
    /// Fails when the value is neither a date nor a timestamp.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(raw, FORMAT).ok().or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|ts| ts.with_timezone(&Utc).date_naive())
        })
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Domain-level errors
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Invalid period '{0}', expected YYYY-MM")]
    InvalidPeriod(String),

    #[error("Invalid amount '{0}', expected a decimal with at most 2 fractional digits")]
    InvalidAmount(String),
}

impl DomainError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::Fake;
    use fake::faker::company::en::CompanyName;
    use fake::faker::name::en::{FirstName, LastName};

    fn ts(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    fn contribution(period: &str, created_at: &str) -> Contribution {
        Contribution {
            id: new_record_id(),
            period: period.parse().unwrap(),
            rssb_number: "1023829A".to_string(),
            matricule: "3100000000A".to_string(),
            amount: "4000000".parse().unwrap(),
            created_at: ts(created_at),
            updated_at: ts(created_at),
        }
    }

    #[test]
    fn test_period_parse_and_order() {
        let jan: Period = "2025-01".parse().unwrap();
        let dec: Period = "2024-12".parse().unwrap();

        assert_eq!(jan.year(), 2025);
        assert_eq!(jan.month(), 1);
        assert_eq!(jan.to_string(), "2025-01");
        assert!(dec < jan);
    }

    #[test]
    fn test_period_rejects_malformed() {
        for raw in ["2025-13", "2025-00", "2025-1", "25-01", "2025/01", "", "abcd-ef"] {
            assert!(raw.parse::<Period>().is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn test_amount_parse_exact() {
        let amount: Amount = "4000000.5".parse().unwrap();
        assert_eq!(amount.minor_units(), 400_000_050);
        assert_eq!(amount.to_string(), "4000000.50");

        let whole: Amount = "12".parse().unwrap();
        assert_eq!(whole.to_string(), "12.00");

        let padded: Amount = "0.100".parse().unwrap();
        assert_eq!(padded.minor_units(), 10);

        let negative: Amount = "-3.07".parse().unwrap();
        assert_eq!(negative.to_string(), "-3.07");
    }

    #[test]
    fn test_amount_rejects_sub_cent_precision() {
        assert!("1.005".parse::<Amount>().is_err());
        assert!("".parse::<Amount>().is_err());
        assert!(".5".parse::<Amount>().is_err());
        assert!("1e3".parse::<Amount>().is_err());
    }

    #[test]
    fn test_amount_json_number_and_string() {
        let from_number: Amount = serde_json::from_str("4000000").unwrap();
        let from_float: Amount = serde_json::from_str("0.1").unwrap();
        let from_string: Amount = serde_json::from_str("\"19.99\"").unwrap();

        assert_eq!(from_number.minor_units(), 400_000_000);
        assert_eq!(from_float.minor_units(), 10);
        assert_eq!(from_string.minor_units(), 1999);
        assert_eq!(serde_json::to_string(&from_string).unwrap(), "\"19.99\"");
    }

    #[test]
    fn test_dob_accepts_date_and_timestamp() {
        let expected = NaiveDate::from_ymd_opt(1990, 1, 15).unwrap();
        assert_eq!(dob_format::parse("1990-01-15"), Some(expected));
        assert_eq!(dob_format::parse("1990-01-15T00:00:00.000Z"), Some(expected));
        assert_eq!(dob_format::parse("15/01/1990"), None);
    }

    #[test]
    fn test_employee_json_shape() {
        let input = NewEmployee {
            firstname: "John".to_string(),
            lastname: "Doe".to_string(),
            rssb_number: "1023829A".to_string(),
            dob: NaiveDate::from_ymd_opt(1990, 1, 15).unwrap(),
        };
        let employee = input.into_employee(ts("2025-01-01T10:00:00Z"));
        let json = serde_json::to_value(&employee).unwrap();

        assert_eq!(json["rssbNumber"], "1023829A");
        assert_eq!(json["dob"], "1990-01-15");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_new_employee_validation() {
        let valid = NewEmployee {
            firstname: FirstName().fake(),
            lastname: LastName().fake(),
            rssb_number: "1023829A".to_string(),
            dob: NaiveDate::from_ymd_opt(1990, 1, 15).unwrap(),
        };
        assert!(valid.validate().is_ok());

        let blank = NewEmployee {
            firstname: "   ".to_string(),
            ..valid.clone()
        };
        assert!(matches!(
            blank.validate(),
            Err(DomainError::Validation { field: "firstname", .. })
        ));

        let bad_key = NewEmployee {
            rssb_number: "1023-829".to_string(),
            ..valid
        };
        assert!(matches!(
            bad_key.validate(),
            Err(DomainError::Validation { field: "rssbNumber", .. })
        ));
    }

    #[test]
    fn test_new_employer_validation() {
        let employer = NewEmployer {
            name: CompanyName().fake(),
            matricule: "3100000000A".to_string(),
        };
        assert!(employer.validate().is_ok());

        let long_key = NewEmployer {
            matricule: "A".repeat(MAX_KEY_LEN + 1),
            ..employer
        };
        assert!(long_key.validate().is_err());
    }

    #[test]
    fn test_new_contribution_rejects_negative_amount() {
        let input = NewContribution {
            period: "2025-01".parse().unwrap(),
            rssb_number: "1023829A".to_string(),
            matricule: "3100000000A".to_string(),
            amount: "-1".parse().unwrap(),
        };
        assert!(matches!(
            input.validate(),
            Err(DomainError::Validation { field: "amount", .. })
        ));
    }

    #[test]
    fn test_filter_precedence() {
        let filter = ContributionFilter::from_params(
            Some("1023829A".to_string()),
            Some("2025-01".to_string()),
            Some("3100000000A".to_string()),
        )
        .unwrap();
        assert_eq!(filter, ContributionFilter::ByRssbNumber("1023829A".to_string()));

        let filter =
            ContributionFilter::from_params(Some(String::new()), Some("2025-01".to_string()), None)
                .unwrap();
        assert_eq!(filter, ContributionFilter::ByPeriod("2025-01".parse().unwrap()));

        assert_eq!(
            ContributionFilter::from_params(None, None, None).unwrap(),
            ContributionFilter::All
        );
        assert!(ContributionFilter::from_params(None, Some("2025".to_string()), None).is_err());
    }

    #[test]
    fn test_contribution_listing_order() {
        let mut rows = vec![
            contribution("2025-01", "2025-02-01T00:00:00Z"),
            contribution("2025-02", "2025-03-01T00:00:00Z"),
            contribution("2025-01", "2025-02-05T00:00:00Z"),
        ];
        Contribution::sort_for_listing(&mut rows);

        let order: Vec<(String, DateTime<Utc>)> = rows
            .iter()
            .map(|c| (c.period.to_string(), c.created_at))
            .collect();
        assert_eq!(
            order,
            vec![
                ("2025-02".to_string(), ts("2025-03-01T00:00:00Z")),
                ("2025-01".to_string(), ts("2025-02-05T00:00:00Z")),
                ("2025-01".to_string(), ts("2025-02-01T00:00:00Z")),
            ]
        );
    }
}
