//! Inbound purchase requests and their validation.

use common::{OrderDetails, ServiceKind, TxRef};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PurchaseError;

/// A purchase as submitted by a client.
///
/// Every field is optional on the wire so that incomplete requests reach
/// validation and get a structured answer instead of a decode error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    #[serde(default, alias = "service")]
    pub service_kind: Option<String>,
    #[serde(default, alias = "details")]
    pub order_details: Option<OrderDetails>,
    #[serde(default, alias = "txHash")]
    pub tx_ref: Option<String>,
}

/// A request that passed every structural check.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPurchase {
    pub kind: ServiceKind,
    pub details: OrderDetails,
    pub tx_ref: TxRef,
}

impl PurchaseRequest {
    pub fn new(
        service_kind: impl Into<String>,
        order_details: OrderDetails,
        tx_ref: impl Into<String>,
    ) -> Self {
        Self {
            service_kind: Some(service_kind.into()),
            order_details: Some(order_details),
            tx_ref: Some(tx_ref.into()),
        }
    }

    /// Decodes a request body, keeping whatever fields are readable.
    ///
    /// A body that fails to decode as a whole still yields its readable
    /// top-level fields, so validation names only what is actually unusable.
    /// A body that is not a JSON object yields an empty request.
    pub fn from_json_lossy(body: &[u8]) -> Self {
        let err = match serde_json::from_slice::<Self>(body) {
            Ok(request) => return request,
            Err(e) => e,
        };
        tracing::debug!(error = %err, "purchase body only partly readable");

        let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) else {
            return Self::default();
        };
        Self {
            service_kind: text_field(&fields, "serviceKind", "service"),
            order_details: field(&fields, "orderDetails", "details")
                .and_then(|value| OrderDetails::deserialize(value).ok()),
            tx_ref: text_field(&fields, "txRef", "txHash"),
        }
    }

    /// The transaction reference, if one was supplied.
    pub fn tx_ref(&self) -> Option<TxRef> {
        self.tx_ref.as_deref().and_then(TxRef::parse)
    }

    /// Checks the request without touching the network.
    ///
    /// Presence of the three top-level parameters is checked first, then
    /// the service kind, then the order keys that kind requires.
    pub fn validate(&self) -> Result<ValidatedPurchase, PurchaseError> {
        let kind = self.service_kind.as_deref().map(str::trim).unwrap_or("");
        let details = self.order_details.as_ref().filter(|d| !d.is_empty());
        let tx_ref = self.tx_ref();

        let mut missing = Vec::new();
        if kind.is_empty() {
            missing.push("serviceKind".to_string());
        }
        if details.is_none() {
            missing.push("orderDetails".to_string());
        }
        if tx_ref.is_none() {
            missing.push("txRef".to_string());
        }

        let (Some(details), Some(tx_ref), false) = (details, tx_ref, kind.is_empty()) else {
            return Err(PurchaseError::MissingParameters(missing));
        };

        let kind: ServiceKind = kind.parse()?;

        let missing_keys = details.missing_fields(kind.required_fields());
        if !missing_keys.is_empty() {
            return Err(PurchaseError::MissingParameters(
                missing_keys
                    .into_iter()
                    .map(|key| format!("orderDetails.{key}"))
                    .collect(),
            ));
        }

        Ok(ValidatedPurchase {
            kind,
            details: details.clone(),
            tx_ref,
        })
    }
}

fn field<'a>(fields: &'a Map<String, Value>, name: &str, alias: &str) -> Option<&'a Value> {
    fields.get(name).or_else(|| fields.get(alias))
}

fn text_field(fields: &Map<String, Value>, name: &str, alias: &str) -> Option<String> {
    field(fields, name, alias)
        .and_then(Value::as_str)
        .map(str::to_string)
}
