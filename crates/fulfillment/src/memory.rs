//! In-memory gateway for tests and local runs.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use common::{OrderDetails, ServiceKind};
use serde_json::{Value, json};

use crate::gateway::{FulfillmentGateway, FulfillmentResult, Rejection};

#[derive(Debug, Clone)]
enum Scripted {
    /// Deliver `{"reference": "FUL-0001"}`, `FUL-0002`, ...
    Sequential,
    Payload(Value),
    Reject(Rejection),
}

#[derive(Debug)]
struct InMemoryGatewayState {
    calls: Vec<(ServiceKind, OrderDetails)>,
    next_id: u32,
    scripted: Scripted,
    unsupported: HashSet<ServiceKind>,
    delay: Option<Duration>,
}

impl Default for InMemoryGatewayState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            next_id: 0,
            scripted: Scripted::Sequential,
            unsupported: HashSet::new(),
            delay: None,
        }
    }
}

/// In-memory fulfillment gateway that records every order it receives.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFulfillmentGateway {
    state: Arc<RwLock<InMemoryGatewayState>>,
}

impl InMemoryFulfillmentGateway {
    /// Creates a gateway that delivers every order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `payload` for every subsequent order.
    pub fn set_payload(&self, payload: Value) {
        self.state.write().unwrap().scripted = Scripted::Payload(payload);
    }

    /// Answers every subsequent order as if the provider returned `status`.
    pub fn set_provider_error(&self, status: u16, body: &str) {
        self.state.write().unwrap().scripted =
            Scripted::Reject(Rejection::provider_status(status, body));
    }

    /// Answers every subsequent order as if the provider were unreachable.
    pub fn set_transport_failure(&self, message: &str) {
        self.state.write().unwrap().scripted = Scripted::Reject(Rejection::transport(message));
    }

    /// Treats `kind` as having no provider endpoint.
    pub fn mark_unsupported(&self, kind: ServiceKind) {
        self.state.write().unwrap().unsupported.insert(kind);
    }

    /// Delays every answer, to widen windows in concurrency tests.
    pub fn set_delay(&self, delay: Duration) {
        self.state.write().unwrap().delay = Some(delay);
    }

    /// Returns the number of orders sent to the "provider".
    pub fn call_count(&self) -> usize {
        self.state.read().unwrap().calls.len()
    }

    /// Returns the orders sent so far.
    pub fn calls(&self) -> Vec<(ServiceKind, OrderDetails)> {
        self.state.read().unwrap().calls.clone()
    }
}

#[async_trait]
impl FulfillmentGateway for InMemoryFulfillmentGateway {
    async fn fulfill(&self, kind: ServiceKind, details: &OrderDetails) -> FulfillmentResult {
        let (result, delay) = {
            let mut state = self.state.write().unwrap();
            if state.unsupported.contains(&kind) {
                return FulfillmentResult::Rejected(Rejection::unsupported(kind));
            }

            state.calls.push((kind, details.clone()));
            let result = match state.scripted.clone() {
                Scripted::Sequential => {
                    state.next_id += 1;
                    FulfillmentResult::Delivered(
                        json!({ "reference": format!("FUL-{:04}", state.next_id) }),
                    )
                }
                Scripted::Payload(payload) => FulfillmentResult::Delivered(payload),
                Scripted::Reject(rejection) => FulfillmentResult::Rejected(rejection),
            };
            (result, state.delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }
}
