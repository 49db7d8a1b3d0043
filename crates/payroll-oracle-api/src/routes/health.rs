//! Liveness probe.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::context::ApiContext;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    /// Seconds since start-up
    pub uptime: u64,
}

/// `GET /health`
pub async fn health(State(ctx): State<ApiContext>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: crate::VERSION,
        uptime: ctx.started_at.elapsed().as_secs(),
    })
}
