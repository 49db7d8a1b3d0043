//! # API Configuration
//!
//! Environment-based configuration for the imisanzu service.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use payroll_persistence::{CacheConfig, RemoteConfig, ScyllaConfig};

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

/// Local employee mirror backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
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

/// Contribution cache backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheBackend {
    Memory,
    #[default]
    Redis,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            other => Err(format!("unknown backend '{other}', expected memory or redis")),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub server_addr: SocketAddr,

    /// Oracle master data API
    pub oracle: RemoteConfig,

    pub store_backend: StoreBackend,
    pub scylla: ScyllaConfig,

    pub cache_backend: CacheBackend,
    /// Redis configuration, used when `cache_backend` is `Redis`
    pub redis: CacheConfig,

    /// Lifetime of a cached contribution list
    pub cache_ttl: Duration,

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
        let cache_ttl_secs: u64 = parse_var(&lookup, "CACHE_TTL_SECS", "60")?;
        if cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "CACHE_TTL_SECS",
                value: cache_ttl_secs.to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }
        let cache_ttl = Duration::from_secs(cache_ttl_secs);
        let redis_defaults = CacheConfig::default();

        Ok(Self {
            server_addr: parse_var(&lookup, "SERVER_ADDR", "0.0.0.0:3001")?,

            oracle: RemoteConfig {
                base_url: lookup("ORACLE_SERVICE_URL")
                    .unwrap_or_else(|| "http://127.0.0.1:3000".to_string()),
                timeout: Duration::from_millis(parse_var(&lookup, "ORACLE_TIMEOUT_MS", "5000")?),
            },

            store_backend: parse_var(&lookup, "STORE_BACKEND", "scylla")?,
            scylla: ScyllaConfig {
                hosts: list_var(&lookup, "SCYLLA_HOSTS", "127.0.0.1:9042"),
                keyspace: lookup("SCYLLA_KEYSPACE").unwrap_or_else(|| "imisanzu".to_string()),
                username: lookup("SCYLLA_USERNAME"),
                password: lookup("SCYLLA_PASSWORD"),
                replication_factor: parse_var(&lookup, "SCYLLA_REPLICATION_FACTOR", "1")?,
            },

            cache_backend: parse_var(&lookup, "CACHE_BACKEND", "redis")?,
            redis: CacheConfig {
                url: lookup("REDIS_URL").unwrap_or(redis_defaults.url),
                retries: parse_var(&lookup, "REDIS_RETRIES", "3")?,
                response_timeout: Duration::from_millis(parse_var(
                    &lookup,
                    "REDIS_RESPONSE_TIMEOUT_MS",
                    "5000",
                )?),
                ..redis_defaults
            },

            cache_ttl,

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

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server_addr.port(), 3001);
        assert_eq!(config.oracle.base_url, "http://127.0.0.1:3000");
        assert_eq!(config.oracle.timeout, Duration::from_secs(5));
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.cache_backend, CacheBackend::Redis);
        assert_eq!(config.redis.retries, 3);
        assert_eq!(config.scylla.keyspace, "imisanzu");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("ORACLE_SERVICE_URL", "http://oracle:3000"),
            ("ORACLE_TIMEOUT_MS", "1500"),
            ("CACHE_BACKEND", "memory"),
            ("CACHE_TTL_SECS", "5"),
            ("REDIS_URL", "redis://cache:6379"),
            ("REDIS_RESPONSE_TIMEOUT_MS", "250"),
        ])
        .unwrap();

        assert_eq!(config.oracle.base_url, "http://oracle:3000");
        assert_eq!(config.oracle.timeout, Duration::from_millis(1500));
        assert_eq!(config.cache_backend, CacheBackend::Memory);
        assert_eq!(config.cache_ttl, Duration::from_secs(5));
        assert_eq!(config.redis.url, "redis://cache:6379");
        assert_eq!(config.redis.response_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_ttl_is_reported() {
        let err = config_from(&[("CACHE_TTL_SECS", "a minute")]).unwrap_err();
        assert!(err.to_string().contains("CACHE_TTL_SECS"));
    }

    #[test]
    fn test_zero_cache_ttl_rejected() {
        let err = config_from(&[("CACHE_TTL_SECS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "CACHE_TTL_SECS", .. }));
    }
}
