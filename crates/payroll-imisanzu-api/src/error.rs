//! # API Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use payroll_persistence::{ContributionCacheError, PersistenceError, RemoteError};

/// API-level errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Entity not found: {entity_type} with key '{key}'")]
    NotFound { entity_type: &'static str, key: String },

    #[error("Master data unavailable: {0}")]
    UpstreamUnavailable(RemoteError),

    #[error("Cache error: {0}")]
    Cache(PersistenceError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl ApiError {
    pub fn not_found(entity_type: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            key: key.into(),
        }
    }

    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::Cache(_) | Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }
}

impl From<ContributionCacheError> for ApiError {
    fn from(err: ContributionCacheError) -> Self {
        match err {
            ContributionCacheError::Upstream(e) => Self::UpstreamUnavailable(e),
            ContributionCacheError::Store(e) => Self::Cache(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = serde_json::json!({
            "error": {
                "message": self.to_string(),
                "code": self.error_code(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
