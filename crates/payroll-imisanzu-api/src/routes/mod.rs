//! # REST Routes

pub mod contributions;
pub mod employees;
pub mod health;

use axum::Router;
use axum::routing::get;

use crate::context::ApiContext;

/// Versioned API routes, to be nested under `/api/v1`
pub fn api_routes() -> Router<ApiContext> {
    Router::new()
        .route("/employees", get(employees::list))
        .route("/employees/{rssb_number}", get(employees::get_one))
        .route(
            "/contributions/employee/{rssb_number}",
            get(contributions::by_employee),
        )
        .route("/contributions/cache/stats", get(contributions::cache_stats))
}
