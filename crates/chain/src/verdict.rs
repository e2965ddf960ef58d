//! Receipt verdicts.

use serde::Serialize;
use thiserror::Error;

/// Why a lookup could not prove success or failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum IndeterminateCause {
    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    RpcError { code: i64, message: String },

    /// The request never produced a usable HTTP response.
    #[error("transport failure: {message}")]
    Transport { message: String },

    /// The node answered but the body could not be understood.
    #[error("malformed RPC response: {message}")]
    Malformed { message: String },

    /// The node has no receipt for the hash (unknown or not yet mined).
    #[error("receipt not found")]
    NotFound,
}

impl IndeterminateCause {
    /// Coarse label, free of node URLs and error text.
    pub fn as_str(&self) -> &'static str {
        match self {
            IndeterminateCause::RpcError { .. } => "rpc_error",
            IndeterminateCause::Transport { .. } => "transport",
            IndeterminateCause::Malformed { .. } => "malformed",
            IndeterminateCause::NotFound => "not_found",
        }
    }
}

/// Classification of a transaction receipt lookup.
///
/// Only [`ReceiptVerdict::Success`] permits fulfillment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum ReceiptVerdict {
    /// Finalized with the success status.
    Success,

    /// Finalized with any other status (reverted or errored).
    Failed { status: String },

    /// Success could not be proven.
    Indeterminate(IndeterminateCause),
}

impl ReceiptVerdict {
    pub fn is_success(&self) -> bool {
        matches!(self, ReceiptVerdict::Success)
    }

    pub fn is_indeterminate(&self) -> bool {
        matches!(self, ReceiptVerdict::Indeterminate(_))
    }

    /// Short label used for metrics and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptVerdict::Success => "success",
            ReceiptVerdict::Failed { .. } => "failed",
            ReceiptVerdict::Indeterminate(_) => "indeterminate",
        }
    }

    /// Like [`Self::as_str`] but names the cause of an indeterminate verdict.
    /// Safe to show to callers.
    pub fn cause_label(&self) -> &'static str {
        match self {
            ReceiptVerdict::Indeterminate(cause) => cause.as_str(),
            other => other.as_str(),
        }
    }

    pub(crate) fn transport(message: impl Into<String>) -> Self {
        ReceiptVerdict::Indeterminate(IndeterminateCause::Transport {
            message: message.into(),
        })
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        ReceiptVerdict::Indeterminate(IndeterminateCause::Malformed {
            message: message.into(),
        })
    }
}

impl std::fmt::Display for ReceiptVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReceiptVerdict::Success => write!(f, "confirmed"),
            ReceiptVerdict::Failed { status } => {
                write!(f, "transaction failed on chain (status {status})")
            }
            ReceiptVerdict::Indeterminate(cause) => write!(f, "not confirmed: {cause}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_success_is_success() {
        assert!(ReceiptVerdict::Success.is_success());
        assert!(
            !ReceiptVerdict::Failed {
                status: "0x0".into()
            }
            .is_success()
        );
        assert!(!ReceiptVerdict::Indeterminate(IndeterminateCause::NotFound).is_success());
    }

    #[test]
    fn labels() {
        assert_eq!(ReceiptVerdict::Success.as_str(), "success");
        assert_eq!(
            ReceiptVerdict::Failed {
                status: "0x0".into()
            }
            .as_str(),
            "failed"
        );
        assert_eq!(ReceiptVerdict::transport("timeout").as_str(), "indeterminate");
    }

    #[test]
    fn cause_labels_carry_no_detail() {
        let verdict = ReceiptVerdict::transport(
            "error sending request for url (http://node.example/v2/SECRET)",
        );
        assert_eq!(verdict.cause_label(), "transport");
        assert_eq!(
            ReceiptVerdict::Indeterminate(IndeterminateCause::NotFound).cause_label(),
            "not_found"
        );
        assert_eq!(
            ReceiptVerdict::malformed("missing result").cause_label(),
            "malformed"
        );
        assert_eq!(
            ReceiptVerdict::Indeterminate(IndeterminateCause::RpcError {
                code: -32000,
                message: "header not found".into(),
            })
            .cause_label(),
            "rpc_error"
        );
        assert_eq!(
            ReceiptVerdict::Failed {
                status: "0x0".into()
            }
            .cause_label(),
            "failed"
        );
    }

    #[test]
    fn display_explains_cause() {
        let verdict = ReceiptVerdict::Indeterminate(IndeterminateCause::RpcError {
            code: -32000,
            message: "header not found".into(),
        });
        assert_eq!(
            verdict.to_string(),
            "not confirmed: RPC error -32000: header not found"
        );
        assert_eq!(
            ReceiptVerdict::Failed {
                status: "0x0".into()
            }
            .to_string(),
            "transaction failed on chain (status 0x0)"
        );
    }

    #[test]
    fn serializes_tagged() {
        let json = serde_json::to_value(ReceiptVerdict::Indeterminate(
            IndeterminateCause::NotFound,
        ))
        .unwrap();
        assert_eq!(json["verdict"], "indeterminate");
    }
}
