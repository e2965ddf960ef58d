//! Network, provider and plan listings.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::header::CACHE_CONTROL;
use axum::response::IntoResponse;
use common::ServiceKind;
use fulfillment::CatalogError;
use fulfillment::catalog::plan_query_param;

use crate::AppState;
use crate::error::ApiError;

const CATALOG_CACHE: &str = "public, max-age=3600";

fn parse_kind(service: &str) -> Result<ServiceKind, ApiError> {
    service
        .parse()
        .map_err(|e: common::UnknownServiceKind| ApiError::BadRequest(e.to_string()))
}

/// GET /api/{service}/networks
#[tracing::instrument(skip(state))]
pub async fn networks(
    State(state): State<Arc<AppState>>,
    Path(service): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&service)?;
    let listing = state.catalog.networks(kind).await;
    Ok(([(CACHE_CONTROL, CATALOG_CACHE)], Json(listing)))
}

/// GET /api/{service}/plans?network= (data) or ?provider= (cable)
#[tracing::instrument(skip(state))]
pub async fn plans(
    State(state): State<Arc<AppState>>,
    Path(service): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&service)?;
    let param = plan_query_param(kind).ok_or(CatalogError::PlansUnsupported(kind))?;
    let key = params
        .get(param)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("Missing required parameter: {param}")))?;

    let listing = state.catalog.plans(kind, key).await?;
    Ok(([(CACHE_CONTROL, CATALOG_CACHE)], Json(listing)))
}
