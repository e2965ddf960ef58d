//! HTTP gateway to the billing provider.

use async_trait::async_trait;
use common::{OrderDetails, ServiceKind};
use reqwest::header::AUTHORIZATION;
use serde_json::Value;

use crate::config::ProviderConfig;
use crate::error::FulfillmentError;
use crate::gateway::{FulfillmentGateway, FulfillmentResult, Rejection};

/// Gateway that POSTs order details to the provider's subscribe endpoints.
#[derive(Debug, Clone)]
pub struct HttpFulfillmentGateway {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl HttpFulfillmentGateway {
    pub fn new(config: ProviderConfig) -> Result<Self, FulfillmentError> {
        reqwest::Url::parse(&config.base_url).map_err(|e| {
            FulfillmentError::Config(format!("invalid provider url {}: {e}", config.base_url))
        })?;
        if config.credential.is_empty() {
            tracing::warn!("provider credential is empty, provider calls will likely be refused");
        }

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    async fn place_order(&self, kind: ServiceKind, details: &OrderDetails) -> FulfillmentResult {
        let Some(url) = self.config.url_for(kind) else {
            return FulfillmentResult::Rejected(Rejection::unsupported(kind));
        };

        let response = match self
            .client
            .post(&url)
            .header(AUTHORIZATION, self.config.credential.header_value())
            .json(details)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return FulfillmentResult::Rejected(Rejection::transport(format!(
                    "Provider request failed: {e}"
                )));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if status.is_success() => {
                return FulfillmentResult::Rejected(Rejection::transport(format!(
                    "Provider accepted the order but the response could not be read: {e}"
                )));
            }
            Err(_) => String::new(),
        };

        if !status.is_success() {
            return FulfillmentResult::Rejected(Rejection::provider_status(status.as_u16(), body));
        }

        FulfillmentResult::Delivered(payload_from_body(body))
    }
}

#[async_trait]
impl FulfillmentGateway for HttpFulfillmentGateway {
    #[tracing::instrument(skip(self, details), fields(service_kind = %kind))]
    async fn fulfill(&self, kind: ServiceKind, details: &OrderDetails) -> FulfillmentResult {
        let started = std::time::Instant::now();
        let result = self.place_order(kind, details).await;

        metrics::counter!("fulfillment_calls_total", "result" => result.as_str()).increment(1);
        metrics::histogram!("fulfillment_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        match &result {
            FulfillmentResult::Delivered(_) => tracing::info!("provider accepted order"),
            FulfillmentResult::Rejected(rejection) => tracing::warn!(
                reason = rejection.reason.as_str(),
                message = %rejection.message,
                "provider rejected order"
            ),
        }

        result
    }
}

/// The provider's 2xx body, passed through without interpretation.
///
/// JSON bodies become the payload as-is, any other text becomes a JSON
/// string, and an empty body becomes `null`.
fn payload_from_body(body: String) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&body).unwrap_or(Value::String(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_body_passes_through() {
        assert_eq!(
            payload_from_body(r#"{"id":"X","status":"failed"}"#.to_string()),
            json!({"id": "X", "status": "failed"})
        );
    }

    #[test]
    fn test_text_body_becomes_string() {
        assert_eq!(
            payload_from_body("OK".to_string()),
            Value::String("OK".to_string())
        );
    }

    #[test]
    fn test_empty_body_is_null() {
        assert_eq!(payload_from_body("  ".to_string()), Value::Null);
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let result = HttpFulfillmentGateway::new(ProviderConfig::new("::nope::", "key"));
        assert!(matches!(result, Err(FulfillmentError::Config(_))));
    }
}
