//! The single result every purchase ends in.

use chrono::{DateTime, Utc};
use common::{PurchaseId, TxRef};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PurchaseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    Success,
    Failure,
}

/// Machine-readable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCode {
    MissingParameters,
    PaymentNotConfirmed,
    UnsupportedService,
    FulfillmentRejected,
    InternalFault,
}

impl FailureCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCode::MissingParameters => "missing_parameters",
            FailureCode::PaymentNotConfirmed => "payment_not_confirmed",
            FailureCode::UnsupportedService => "unsupported_service",
            FailureCode::FulfillmentRejected => "fulfillment_rejected",
            FailureCode::InternalFault => "internal_fault",
        }
    }
}

impl std::fmt::Display for FailureCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of processing one purchase request.
///
/// On success `data` carries the provider's response verbatim. On failure
/// `error` and `code` are set, and `payment_confirmed` tells the caller
/// whether the chain payment already happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOutcome {
    pub status: PurchaseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_ref: Option<TxRef>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<FailureCode>,
    pub payment_confirmed: bool,
    pub purchase_id: PurchaseId,
}

impl PurchaseOutcome {
    pub fn delivered(purchase_id: PurchaseId, tx_ref: TxRef, data: Value) -> Self {
        Self {
            status: PurchaseStatus::Success,
            data: Some(data),
            tx_ref: Some(tx_ref),
            timestamp: Utc::now(),
            error: None,
            code: None,
            payment_confirmed: true,
            purchase_id,
        }
    }

    pub fn failed(
        purchase_id: PurchaseId,
        tx_ref: Option<TxRef>,
        error: &PurchaseError,
        payment_confirmed: bool,
    ) -> Self {
        Self {
            status: PurchaseStatus::Failure,
            data: None,
            tx_ref,
            timestamp: Utc::now(),
            error: Some(error.public_message(payment_confirmed)),
            code: Some(error.code()),
            payment_confirmed,
            purchase_id,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == PurchaseStatus::Success
    }

    /// Label used for the outcome metric: `success` or the failure code.
    pub fn label(&self) -> &'static str {
        match self.code {
            Some(code) => code.as_str(),
            None => "success",
        }
    }
}
