//! Purchase error types.

use chain::ReceiptVerdict;
use common::{TxRef, UnknownServiceKind};
use fulfillment::RejectReason;
use thiserror::Error;

use crate::outcome::FailureCode;

/// Errors that can end a purchase.
#[derive(Debug, Clone, Error)]
pub enum PurchaseError {
    /// The request is structurally incomplete.
    #[error("Missing required parameters: {}", .0.join(", "))]
    MissingParameters(Vec<String>),

    /// The chain did not confirm the payment.
    #[error("Transaction not confirmed or failed: {verdict}")]
    PaymentNotConfirmed { tx_ref: TxRef, verdict: ReceiptVerdict },

    /// The service kind is not one we sell.
    #[error("Unsupported service: {0}")]
    UnsupportedService(String),

    /// The payment is confirmed on chain but the provider did not deliver.
    #[error("Payment confirmed but fulfillment failed: {message}")]
    FulfillmentRejected {
        tx_ref: TxRef,
        reason: RejectReason,
        message: String,
    },

    /// Anything unanticipated, including panics in collaborators.
    #[error("Internal fault: {0}")]
    InternalFault(String),
}

impl PurchaseError {
    pub fn code(&self) -> FailureCode {
        match self {
            PurchaseError::MissingParameters(_) => FailureCode::MissingParameters,
            PurchaseError::PaymentNotConfirmed { .. } => FailureCode::PaymentNotConfirmed,
            PurchaseError::UnsupportedService(_) => FailureCode::UnsupportedService,
            PurchaseError::FulfillmentRejected { .. } => FailureCode::FulfillmentRejected,
            PurchaseError::InternalFault(_) => FailureCode::InternalFault,
        }
    }

    /// Message safe to return to the caller.
    ///
    /// Transport and node errors are reduced to a coarse label; their full
    /// text can carry upstream URLs and stays in the logs.
    pub fn public_message(&self, payment_confirmed: bool) -> String {
        match self {
            PurchaseError::PaymentNotConfirmed { verdict, .. } => format!(
                "Transaction not confirmed or failed ({})",
                verdict.cause_label()
            ),
            PurchaseError::FulfillmentRejected {
                reason, message, ..
            } => {
                let detail = match reason {
                    RejectReason::Transport => "provider could not be reached",
                    RejectReason::ProviderStatus { .. } | RejectReason::UnsupportedService => {
                        message.as_str()
                    }
                };
                format!(
                    "Payment confirmed on chain but service delivery failed: {detail}. \
                     Do not resend payment; contact support with the transaction reference."
                )
            }
            PurchaseError::InternalFault(_) if payment_confirmed => {
                "Payment confirmed on chain but service delivery status is unknown. \
                 Do not resend payment; contact support with the transaction reference."
                    .to_string()
            }
            PurchaseError::InternalFault(_) => "Service purchase failed".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<UnknownServiceKind> for PurchaseError {
    fn from(err: UnknownServiceKind) -> Self {
        PurchaseError::UnsupportedService(err.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain::IndeterminateCause;

    #[test]
    fn test_missing_parameters_message_lists_fields() {
        let err = PurchaseError::MissingParameters(vec!["serviceKind".into(), "txRef".into()]);
        assert_eq!(
            err.to_string(),
            "Missing required parameters: serviceKind, txRef"
        );
        assert_eq!(err.code(), FailureCode::MissingParameters);
    }

    #[test]
    fn test_payment_not_confirmed_message() {
        let err = PurchaseError::PaymentNotConfirmed {
            tx_ref: TxRef::parse("0xabc").unwrap(),
            verdict: ReceiptVerdict::Indeterminate(IndeterminateCause::NotFound),
        };
        assert_eq!(
            err.to_string(),
            "Transaction not confirmed or failed: not confirmed: receipt not found"
        );
    }

    #[test]
    fn test_internal_fault_is_not_leaked() {
        let err = PurchaseError::InternalFault("index out of bounds".into());
        assert_eq!(err.public_message(false), "Service purchase failed");
        assert!(!err.public_message(true).contains("index out of bounds"));
        assert!(err.public_message(true).contains("Do not resend payment"));
    }

    #[test]
    fn test_fulfillment_rejected_tells_caller_payment_happened() {
        let err = PurchaseError::FulfillmentRejected {
            tx_ref: TxRef::parse("0xabc").unwrap(),
            reason: RejectReason::Transport,
            message: "connection reset".into(),
        };
        let message = err.public_message(true);
        assert!(message.starts_with("Payment confirmed on chain"));
        assert!(message.contains("provider could not be reached"));
        assert!(!message.contains("connection reset"));
    }

    #[test]
    fn test_provider_status_is_reported() {
        let err = PurchaseError::FulfillmentRejected {
            tx_ref: TxRef::parse("0xabc").unwrap(),
            reason: RejectReason::ProviderStatus {
                status: 422,
                body: "invalid phone".into(),
            },
            message: "Provider API error: 422 - invalid phone".into(),
        };
        assert!(
            err.public_message(true)
                .contains("Provider API error: 422 - invalid phone")
        );
    }

    #[test]
    fn test_unconfirmed_payment_hides_node_error() {
        let err = PurchaseError::PaymentNotConfirmed {
            tx_ref: TxRef::parse("0xabc").unwrap(),
            verdict: ReceiptVerdict::Indeterminate(IndeterminateCause::Transport {
                message: "error sending request for url (https://node.example/v2/KEY)".into(),
            }),
        };
        assert_eq!(
            err.public_message(false),
            "Transaction not confirmed or failed (transport)"
        );
    }

    #[test]
    fn test_from_unknown_kind() {
        let err: PurchaseError = UnknownServiceKind("betting".into()).into();
        assert!(matches!(err, PurchaseError::UnsupportedService(ref s) if s == "betting"));
    }
}
