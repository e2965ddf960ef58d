//! Exchange rate endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::header::CACHE_CONTROL;
use axum::response::IntoResponse;

use crate::AppState;

/// GET /api/price: current USD-Coin to NGN rate, or the fallback rate.
pub async fn get(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let quote = state.prices.quote().await;
    ([(CACHE_CONTROL, "public, max-age=300")], Json(quote))
}
