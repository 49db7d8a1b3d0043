//! HTTP client for the authoritative master-data API.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, RequestBuilder, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use payroll_domain::{Contribution, Employee};

// =============================================================================
// ERRORS
// =============================================================================

/// Master data fetch failures, split by what went wrong on the wire
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Malformed payload from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Requested RSSB number {requested} but master data returned {returned}")]
    KeyMismatch { requested: String, returned: String },
}

impl RemoteError {
    fn from_reqwest(url: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if err.is_decode() {
            Self::Decode {
                url: url.to_string(),
                message: err.to_string(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }

    /// The API answered 404 for the requested key
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    /// Short category label for logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Timeout { .. } => "timeout",
            Self::Status { .. } => "status",
            Self::Decode { .. } | Self::KeyMismatch { .. } => "decode",
        }
    }
}

// =============================================================================
// PAYLOADS
// =============================================================================

/// Employee as served by the master-data API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEmployee {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub rssb_number: String,
    #[serde(with = "payroll_domain::dob_format")]
    pub dob: NaiveDate,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RemoteEmployee {
    /// Local mirror record: remote identity and attributes, local timestamps
    #[must_use]
    pub fn into_local(self, now: DateTime<Utc>) -> Employee {
        Employee {
            id: self.id,
            firstname: self.firstname,
            lastname: self.lastname,
            rssb_number: self.rssb_number,
            dob: self.dob,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// Read access to the authoritative master data
#[async_trait]
pub trait MasterDataClient: Send + Sync {
    /// `GET /api/v1/employees/{rssbNumber}`
    async fn get_employee(&self, rssb_number: &str) -> Result<RemoteEmployee, RemoteError>;

    /// `GET /api/v1/contributions?rssbNumber=...`, in the order served
    async fn get_contributions(&self, rssb_number: &str) -> Result<Vec<Contribution>, RemoteError>;
}

/// Master data client configuration
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// `reqwest`-backed master data client
#[derive(Debug, Clone)]
pub struct HttpMasterDataClient {
    http: Client,
    base_url: Url,
}

impl HttpMasterDataClient {
    /// Create a client with the configured request timeout
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Transport` if the base URL cannot take path
    /// segments or the TLS backend cannot initialize.
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let raw = config.base_url.trim_end_matches('/');
        let base_url = Url::parse(raw)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| RemoteError::Transport {
                url: raw.to_string(),
                message: "invalid base URL".to_string(),
            })?;

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RemoteError::from_reqwest(raw, &e))?;

        Ok(Self { http, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Base URL extended with one percent-encoded path segment per item
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> Result<T, RemoteError> {
        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::from_reqwest(url, &e))?;

        let status = response.status();
        tracing::debug!(url, status = status.as_u16(), "Master data response");

        if !status.is_success() {
            return Err(RemoteError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RemoteError::from_reqwest(url, &e))?;

        serde_json::from_slice(&body).map_err(|e| RemoteError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl MasterDataClient for HttpMasterDataClient {
    async fn get_employee(&self, rssb_number: &str) -> Result<RemoteEmployee, RemoteError> {
        let url = self.endpoint(&["api", "v1", "employees", rssb_number]);
        self.fetch_json(self.http.get(url.clone()), url.as_str()).await
    }

    async fn get_contributions(&self, rssb_number: &str) -> Result<Vec<Contribution>, RemoteError> {
        let url = self.endpoint(&["api", "v1", "contributions"]);
        let request = self.http.get(url.clone()).query(&[("rssbNumber", rssb_number)]);
        self.fetch_json(request, url.as_str()).await
    }
}
