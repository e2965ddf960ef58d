//! Purchase state machine.

use serde::{Deserialize, Serialize};

use crate::error::PurchaseError;

/// The state of a purchase in its lifecycle.
///
/// State transitions:
/// ```text
/// Received ──► Validating ──┬──► Invalid
///                           └──► Verifying ──┬──► Unverified
///                                            └──► Fulfilling ──┬──► Delivered
///                                                              └──► FulfillmentRejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PurchaseState {
    /// Request accepted, nothing checked yet.
    #[default]
    Received,

    /// Structural checks in progress.
    Validating,

    /// Request rejected before any network call (terminal state).
    Invalid,

    /// Waiting on the chain receipt.
    Verifying,

    /// Payment not confirmed on chain (terminal state).
    Unverified,

    /// Payment confirmed, order is with the provider.
    Fulfilling,

    /// Provider accepted the order (terminal state).
    Delivered,

    /// Payment confirmed but the provider did not deliver (terminal state).
    FulfillmentRejected,
}

impl PurchaseState {
    /// Returns true if `next` is a legal successor of this state.
    pub fn can_transition_to(&self, next: PurchaseState) -> bool {
        use PurchaseState::*;
        matches!(
            (self, next),
            (Received, Validating)
                | (Validating, Invalid)
                | (Validating, Verifying)
                | (Verifying, Unverified)
                | (Verifying, Fulfilling)
                | (Fulfilling, Delivered)
                | (Fulfilling, FulfillmentRejected)
        )
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PurchaseState::Invalid
                | PurchaseState::Unverified
                | PurchaseState::Delivered
                | PurchaseState::FulfillmentRejected
        )
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseState::Received => "Received",
            PurchaseState::Validating => "Validating",
            PurchaseState::Invalid => "Invalid",
            PurchaseState::Verifying => "Verifying",
            PurchaseState::Unverified => "Unverified",
            PurchaseState::Fulfilling => "Fulfilling",
            PurchaseState::Delivered => "Delivered",
            PurchaseState::FulfillmentRejected => "FulfillmentRejected",
        }
    }
}

impl std::fmt::Display for PurchaseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracks the path a single purchase took through [`PurchaseState`].
#[derive(Debug, Clone, Default)]
pub struct PurchaseProgress {
    history: Vec<PurchaseState>,
}

impl PurchaseProgress {
    pub fn new() -> Self {
        Self {
            history: vec![PurchaseState::Received],
        }
    }

    pub fn state(&self) -> PurchaseState {
        self.history.last().copied().unwrap_or_default()
    }

    pub fn history(&self) -> &[PurchaseState] {
        &self.history
    }

    /// Moves to `next`, refusing transitions the state machine does not allow.
    pub fn advance(&mut self, next: PurchaseState) -> Result<(), PurchaseError> {
        let current = self.state();
        if !current.can_transition_to(next) {
            return Err(PurchaseError::InternalFault(format!(
                "illegal purchase transition {current} -> {next}"
            )));
        }
        self.history.push(next);
        Ok(())
    }

    /// True once the chain confirmed the payment, whatever happened after.
    pub fn payment_confirmed(&self) -> bool {
        self.history.contains(&PurchaseState::Fulfilling)
    }
}
