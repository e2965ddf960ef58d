//! Fulfillment crate error types.

use common::ServiceKind;
use thiserror::Error;

/// Errors raised while setting up the provider client.
///
/// Calls to the provider never return this type; their failures are
/// reported as [`crate::FulfillmentResult::Rejected`].
#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// The HTTP client could not be built.
    #[error("Failed to build provider client: {0}")]
    ClientBuild(#[from] reqwest::Error),

    /// The provider configuration is unusable.
    #[error("Invalid provider configuration: {0}")]
    Config(String),
}

/// Errors from catalog lookups that no fallback can answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The service kind has no plan listing.
    #[error("Plans are not available for {0}")]
    PlansUnsupported(ServiceKind),
}
