//! # Payroll Oracle API
//!
//! Authoritative REST service for payroll master data.
//!
//! ## Features
//!
//! - **Employees**: keyed by RSSB number, created once, never auto-synced
//! - **Employers**: keyed by matricule
//! - **Contributions**: per employee, employer and period, filterable by one key
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Axum HTTP Server                         │
//! │             (/api/v1 routes, /health, CORS, tracing)        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ApiContext                               │
//! │                   (MasterStore)                             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              ScyllaDB (or in-memory) master store           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod context;
pub mod error;
pub mod routes;

use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::{Config, ConfigError, StoreBackend};
pub use context::ApiContext;
pub use error::{ApiError, ApiResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CORS layer for the configured origins, `*` allowing any
#[must_use]
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

/// Build the Axum router
pub fn build_router(ctx: ApiContext, cors_origins: &[String]) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .route("/health", get(routes::health::health))
        .with_state(ctx)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}
