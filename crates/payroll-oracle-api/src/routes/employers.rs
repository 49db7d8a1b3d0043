//! Handlers for `/employers` endpoints.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::context::ApiContext;
use crate::error::{ApiError, ApiResult};
use payroll_domain::{Employer, NewEmployer, timestamp_now};
use payroll_persistence::EmployerRepository;

/// `GET /employers`
pub async fn list(State(ctx): State<ApiContext>) -> ApiResult<Json<Vec<Employer>>> {
    Ok(Json(ctx.store.employers.find_all().await?))
}

/// `GET /employers/{matricule}`
pub async fn get_one(
    State(ctx): State<ApiContext>,
    Path(matricule): Path<String>,
) -> ApiResult<Json<Employer>> {
    ctx.store
        .employers
        .find_by_matricule(&matricule)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("employer", matricule))
}

/// `POST /employers`
pub async fn create(
    State(ctx): State<ApiContext>,
    body: Result<Json<NewEmployer>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Employer>)> {
    let Json(input) = body?;
    input.validate()?;

    let employer = ctx
        .store
        .employers
        .create(&input.into_employer(timestamp_now()))
        .await?;

    tracing::info!(id = %employer.id, matricule = %employer.matricule, "Employer created");

    Ok((StatusCode::CREATED, Json(employer)))
}
