//! Purchase endpoint.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use purchase::{FailureCode, PurchaseOutcome, PurchaseRequest};

use crate::AppState;

/// POST /api/purchase: verify the chain payment, then place the order.
///
/// The body is always a [`PurchaseOutcome`]. Fields that cannot be decoded
/// are reported as missing parameters.
#[tracing::instrument(skip_all)]
pub async fn create(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> (StatusCode, Json<PurchaseOutcome>) {
    let request = PurchaseRequest::from_json_lossy(&body);
    let outcome = state.orchestrator.process(request).await;
    (status_for(&outcome), Json(outcome))
}

/// HTTP status for an outcome.
pub fn status_for(outcome: &PurchaseOutcome) -> StatusCode {
    match outcome.code {
        None => StatusCode::OK,
        Some(FailureCode::MissingParameters | FailureCode::UnsupportedService) => {
            StatusCode::BAD_REQUEST
        }
        Some(FailureCode::PaymentNotConfirmed) => StatusCode::PAYMENT_REQUIRED,
        Some(FailureCode::FulfillmentRejected) => StatusCode::BAD_GATEWAY,
        Some(FailureCode::InternalFault) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
