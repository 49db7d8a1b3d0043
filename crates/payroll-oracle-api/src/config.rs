//! # API Configuration
//!
//! Environment-based configuration for the oracle service.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use payroll_persistence::ScyllaConfig;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {var}='{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Master store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// Process-local maps, contents lost on restart
    Memory,
    #[default]
    Scylla,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "scylla" => Ok(Self::Scylla),
            other => Err(format!("unknown backend '{other}', expected memory or scylla")),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub server_addr: SocketAddr,

    pub store_backend: StoreBackend,

    /// ScyllaDB configuration, used when `store_backend` is `Scylla`
    pub scylla: ScyllaConfig,

    /// Logging level, used when `RUST_LOG` is unset
    pub log_level: String,

    /// CORS allowed origins, `*` for any
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first malformed variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first malformed variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = ScyllaConfig::default();

        Ok(Self {
            server_addr: parse_var(&lookup, "SERVER_ADDR", "0.0.0.0:3000")?,

            store_backend: parse_var(&lookup, "STORE_BACKEND", "scylla")?,

            scylla: ScyllaConfig {
                hosts: list_var(&lookup, "SCYLLA_HOSTS", "127.0.0.1:9042"),
                keyspace: lookup("SCYLLA_KEYSPACE").unwrap_or(defaults.keyspace),
                username: lookup("SCYLLA_USERNAME"),
                password: lookup("SCYLLA_PASSWORD"),
                replication_factor: parse_var(&lookup, "SCYLLA_REPLICATION_FACTOR", "1")?,
            },

            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),

            cors_origins: list_var(&lookup, "CORS_ORIGINS", "*"),
        })
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = lookup(var).unwrap_or_else(|| default.to_string());
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
        value,
    })
}

fn list_var(lookup: &impl Fn(&str) -> Option<String>, var: &str, default: &str) -> Vec<String> {
    lookup(var)
        .unwrap_or_else(|| default.to_string())
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
