//! Handlers for `/employees` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/employees` | Local mirror only, newest first |
//! | `GET`  | `/employees/{rssbNumber}` | Synced from the oracle on a local miss, 404 if unresolved |

use axum::Json;
use axum::extract::{Path, State};

use crate::context::ApiContext;
use crate::error::{ApiError, ApiResult};
use payroll_domain::Employee;
use payroll_persistence::{EmployeeRepository, Resolution};

/// `GET /employees`
pub async fn list(State(ctx): State<ApiContext>) -> ApiResult<Json<Vec<Employee>>> {
    Ok(Json(ctx.employees.find_all().await?))
}

/// `GET /employees/{rssbNumber}`
pub async fn get_one(
    State(ctx): State<ApiContext>,
    Path(rssb_number): Path<String>,
) -> ApiResult<Json<Employee>> {
    let resolution = ctx.sync.resolve(&rssb_number).await?;
    tracing::debug!(rssb_number = %rssb_number, path = resolution.path(), "Employee lookup resolved");

    match resolution {
        Resolution::Local(employee) | Resolution::Synced(employee) => Ok(Json(employee)),
        Resolution::NotFound | Resolution::SyncFailed(_) => {
            Err(ApiError::not_found("employee", rssb_number))
        }
    }
}
