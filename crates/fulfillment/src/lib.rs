//! Billing provider integration.
//!
//! The gateway turns a `(ServiceKind, OrderDetails)` pair into one
//! authenticated POST against the provider and normalizes the answer into a
//! [`FulfillmentResult`]. The catalog module serves the provider's network and
//! plan listings with hardcoded fallbacks.

pub mod catalog;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod memory;

pub use catalog::{HttpProviderCatalog, ProviderCatalog, StaticCatalog};
pub use config::{ProviderConfig, ProviderCredential};
pub use error::{CatalogError, FulfillmentError};
pub use gateway::{FulfillmentGateway, FulfillmentResult, RejectReason, Rejection};
pub use http::HttpFulfillmentGateway;
pub use memory::InMemoryFulfillmentGateway;
