//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chain::ChainError;
use fulfillment::{CatalogError, FulfillmentError};
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
///
/// Purchase failures never use this type: they are carried by the outcome
/// body itself so the caller always sees `paymentConfirmed`.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Catalog lookup that no fallback can answer.
    Catalog(CatalogError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Catalog(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Catalog(err)
    }
}

/// Errors that prevent the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Fulfillment(#[from] FulfillmentError),

    #[error("Failed to build price feed client: {0}")]
    PriceFeed(#[source] reqwest::Error),
}

/// Errors from the exchange rate source.
#[derive(Debug, Error)]
pub enum PriceError {
    #[error("Price request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Price source answered {0}")]
    Status(u16),

    #[error("Price response has no usable rate: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ServiceKind;

    #[test]
    fn test_catalog_error_is_bad_request() {
        let response = ApiError::from(CatalogError::PlansUnsupported(ServiceKind::Airtime))
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_error_status() {
        let response = ApiError::Internal("boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
