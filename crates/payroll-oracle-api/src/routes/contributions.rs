//! Handlers for `/contributions` endpoints.
//!
//! `GET /contributions` accepts one of `rssbNumber`, `period` (`YYYY-MM`)
//! or `matricule`. When several are given, the first in that order wins.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::context::ApiContext;
use crate::error::ApiResult;
use payroll_domain::{Contribution, ContributionFilter, NewContribution, timestamp_now};
use payroll_persistence::ContributionRepository;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub rssb_number: Option<String>,
    pub period: Option<String>,
    pub matricule: Option<String>,
}

/// `GET /contributions[?rssbNumber=|period=|matricule=]`
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Contribution>>> {
    let filter = ContributionFilter::from_params(params.rssb_number, params.period, params.matricule)?;
    tracing::debug!(?filter, "Listing contributions");

    Ok(Json(ctx.store.contributions.find(&filter).await?))
}

/// `POST /contributions`
pub async fn create(
    State(ctx): State<ApiContext>,
    body: Result<Json<NewContribution>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Contribution>)> {
    let Json(input) = body?;
    input.validate()?;

    let contribution = ctx
        .store
        .contributions
        .create(&input.into_contribution(timestamp_now()))
        .await?;

    tracing::info!(
        id = %contribution.id,
        rssb_number = %contribution.rssb_number,
        period = %contribution.period,
        "Contribution created"
    );

    Ok((StatusCode::CREATED, Json(contribution)))
}
