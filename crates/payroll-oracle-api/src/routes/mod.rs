//! # REST Routes
//!
//! Handlers for the `/api/v1` surface and the root health probe.

pub mod contributions;
pub mod employees;
pub mod employers;
pub mod health;

use axum::Router;
use axum::routing::get;

use crate::context::ApiContext;

/// Versioned API routes, to be nested under `/api/v1`
pub fn api_routes() -> Router<ApiContext> {
    Router::new()
        // Employees
        .route("/employees", get(employees::list).post(employees::create))
        .route("/employees/{rssb_number}", get(employees::get_one))
        // Employers
        .route("/employers", get(employers::list).post(employers::create))
        .route("/employers/{matricule}", get(employers::get_one))
        // Contributions
        .route(
            "/contributions",
            get(contributions::list).post(contributions::create),
        )
}
