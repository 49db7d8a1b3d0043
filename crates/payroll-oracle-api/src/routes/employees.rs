//! Handlers for `/employees` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/employees` | Newest first |
//! | `POST` | `/employees` | 409 if the RSSB number is taken |
//! | `GET`  | `/employees/{rssbNumber}` | 404 if not found |

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::context::ApiContext;
use crate::error::{ApiError, ApiResult};
use payroll_domain::{Employee, NewEmployee, timestamp_now};
use payroll_persistence::EmployeeRepository;

/// `GET /employees`
pub async fn list(State(ctx): State<ApiContext>) -> ApiResult<Json<Vec<Employee>>> {
    let employees = ctx.store.employees.find_all().await?;
    Ok(Json(employees))
}

/// `GET /employees/{rssbNumber}`
pub async fn get_one(
    State(ctx): State<ApiContext>,
    Path(rssb_number): Path<String>,
) -> ApiResult<Json<Employee>> {
    let employee = ctx
        .store
        .employees
        .find_by_rssb_number(&rssb_number)
        .await?
        .ok_or_else(|| ApiError::not_found("employee", rssb_number))?;
    Ok(Json(employee))
}

/// `POST /employees`
pub async fn create(
    State(ctx): State<ApiContext>,
    body: Result<Json<NewEmployee>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Employee>)> {
    let Json(input) = body?;
    input.validate()?;

    let employee = ctx
        .store
        .employees
        .create(&input.into_employee(timestamp_now()))
        .await?;

    tracing::info!(
        id = %employee.id,
        rssb_number = %employee.rssb_number,
        "Employee created"
    );

    Ok((StatusCode::CREATED, Json(employee)))
}
