//! The fulfillment seam and its result types.

use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderDetails, ServiceKind};
use serde::Serialize;
use serde_json::Value;

/// Why the provider did not deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    /// No provider endpoint is mapped for the service kind.
    UnsupportedService,

    /// The provider answered with a non-2xx status.
    ProviderStatus { status: u16, body: String },

    /// The provider could not be reached or its answer could not be read.
    Transport,
}

impl RejectReason {
    /// Short label used for metrics and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::UnsupportedService => "unsupported_service",
            RejectReason::ProviderStatus { .. } => "provider_status",
            RejectReason::Transport => "transport",
        }
    }
}

/// A fulfillment that did not deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    #[serde(flatten)]
    pub reason: RejectReason,
    pub message: String,
}

impl Rejection {
    pub fn unsupported(kind: ServiceKind) -> Self {
        Self {
            reason: RejectReason::UnsupportedService,
            message: format!("Invalid service: {kind}"),
        }
    }

    pub fn provider_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        Self {
            message: format!("Provider API error: {status} - {body}"),
            reason: RejectReason::ProviderStatus { status, body },
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            reason: RejectReason::Transport,
            message: message.into(),
        }
    }
}

/// Normalized provider answer.
#[derive(Debug, Clone, PartialEq)]
pub enum FulfillmentResult {
    /// The provider accepted the order; the payload is its response body.
    Delivered(Value),

    /// The provider did not accept the order.
    Rejected(Rejection),
}

impl FulfillmentResult {
    pub fn is_delivered(&self) -> bool {
        matches!(self, FulfillmentResult::Delivered(_))
    }

    /// Short label used for metrics and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentResult::Delivered(_) => "delivered",
            FulfillmentResult::Rejected(rejection) => rejection.reason.as_str(),
        }
    }
}

/// Delivers a service through the billing provider.
#[async_trait]
pub trait FulfillmentGateway: Send + Sync {
    /// Places the order. Called at most once per purchase.
    async fn fulfill(&self, kind: ServiceKind, details: &OrderDetails) -> FulfillmentResult;
}

#[async_trait]
impl<T: FulfillmentGateway + ?Sized> FulfillmentGateway for Arc<T> {
    async fn fulfill(&self, kind: ServiceKind, details: &OrderDetails) -> FulfillmentResult {
        (**self).fulfill(kind, details).await
    }
}
