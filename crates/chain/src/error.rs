//! Chain crate error types.

use thiserror::Error;

/// Errors raised while setting up chain access.
///
/// Lookups themselves never fail: every problem during a lookup is folded
/// into [`crate::ReceiptVerdict::Indeterminate`].
#[derive(Debug, Error)]
pub enum ChainError {
    /// The HTTP client for the node could not be built.
    #[error("Failed to build RPC client: {0}")]
    ClientBuild(#[from] reqwest::Error),

    /// The RPC configuration is unusable.
    #[error("Invalid RPC configuration: {0}")]
    Config(String),
}
