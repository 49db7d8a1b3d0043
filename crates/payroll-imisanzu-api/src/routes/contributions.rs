//! Handlers for `/contributions` endpoints.

use axum::Json;
use axum::extract::{Path, State};

use crate::context::ApiContext;
use crate::error::ApiResult;
use payroll_domain::Contribution;
use payroll_persistence::CacheStats;

/// `GET /contributions/employee/{rssbNumber}`
pub async fn by_employee(
    State(ctx): State<ApiContext>,
    Path(rssb_number): Path<String>,
) -> ApiResult<Json<Vec<Contribution>>> {
    Ok(Json(ctx.contributions.get_by_employee(&rssb_number).await?))
}

/// `GET /contributions/cache/stats`
pub async fn cache_stats(State(ctx): State<ApiContext>) -> ApiResult<Json<CacheStats>> {
    Ok(Json(ctx.contributions.stats().await?))
}
