//! Persistence layer error types

use thiserror::Error;

/// Persistence layer errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("ScyllaDB error: {0}")]
    Scylla(String),

    #[error("Redis error: {0}")]
    Redis(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Business key already present; raised by `create` on a duplicate insert
    #[error("Conflict: {entity_type} with key {key} already exists")]
    Conflict { entity_type: String, key: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PersistenceError {
    pub fn conflict(entity_type: &str, key: &str) -> Self {
        Self::Conflict {
            entity_type: entity_type.to_string(),
            key: key.to_string(),
        }
    }

    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<payroll_domain::DomainError> for PersistenceError {
    fn from(err: payroll_domain::DomainError) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(feature = "scylla")]
impl From<scylla::transport::errors::NewSessionError> for PersistenceError {
    fn from(err: scylla::transport::errors::NewSessionError) -> Self {
        Self::Scylla(err.to_string())
    }
}

#[cfg(feature = "scylla")]
impl From<scylla::transport::errors::QueryError> for PersistenceError {
    fn from(err: scylla::transport::errors::QueryError) -> Self {
        Self::Scylla(err.to_string())
    }
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for PersistenceError {
    fn from(err: redis::RedisError) -> Self {
        Self::Redis(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PersistenceError>;
