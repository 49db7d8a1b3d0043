//! # Payroll Imisanzu API
//!
//! Downstream REST service that mirrors employees from the oracle on demand
//! and serves contribution lists through a short-lived cache.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Axum HTTP Server                         │
//! └─────────────────────────────────────────────────────────────┘
//!                    │                         │
//!                    ▼                         ▼
//! ┌──────────────────────────────┐ ┌────────────────────────────┐
//! │  EmployeeSync (read-repair)  │ │ ContributionCache (60s TTL)│
//! └──────────────────────────────┘ └────────────────────────────┘
//!         │              │                │             │
//!         ▼              ▼                ▼             ▼
//! ┌──────────────┐ ┌──────────────────────────────┐ ┌──────────┐
//! │ Local mirror │ │   Oracle API (reqwest)       │ │  Redis   │
//! └──────────────┘ └──────────────────────────────┘ └──────────┘
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

pub use config::{CacheBackend, Config, ConfigError, StoreBackend};
pub use context::ApiContext;
pub use error::{ApiError, ApiResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
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
