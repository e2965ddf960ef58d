//! Payment verification and fulfillment pipeline.
//!
//! A purchase runs strictly in order:
//! 1. Validate the request (no network traffic)
//! 2. Verify the chain receipt for the claimed transaction
//! 3. Fulfill through the provider, only if the receipt was confirmed
//!
//! Every request ends in a [`PurchaseOutcome`]; errors and panics are
//! converted at the orchestrator boundary and never escape to the caller.

pub mod error;
pub mod orchestrator;
pub mod outcome;
pub mod request;
pub mod state;

pub use error::PurchaseError;
pub use orchestrator::PurchaseOrchestrator;
pub use outcome::{FailureCode, PurchaseOutcome, PurchaseStatus};
pub use request::{PurchaseRequest, ValidatedPurchase};
pub use state::{PurchaseProgress, PurchaseState};
