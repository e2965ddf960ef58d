//! Network, provider and plan listings.
//!
//! Listings are read through from the provider on every call. When the
//! provider cannot answer, a hardcoded listing is served instead so the
//! storefront keeps working; the purchase path never depends on this module.

use async_trait::async_trait;
use common::ServiceKind;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde_json::{Value, json};

use crate::config::ProviderConfig;
use crate::error::{CatalogError, FulfillmentError};

/// Source of catalog listings.
#[async_trait]
pub trait ProviderCatalog: Send + Sync {
    /// Networks (or providers, for cable and electricity) for `kind`.
    async fn networks(&self, kind: ServiceKind) -> Value;

    /// Plans offered by `key` (a data network or a cable provider).
    async fn plans(&self, kind: ServiceKind, key: &str) -> Result<Value, CatalogError>;
}

/// Query parameter naming the plan owner, for kinds that have plans.
pub fn plan_query_param(kind: ServiceKind) -> Option<&'static str> {
    match kind {
        ServiceKind::Data => Some("network"),
        ServiceKind::Cable => Some("provider"),
        ServiceKind::Airtime | ServiceKind::Electricity => None,
    }
}

fn networks_path(kind: ServiceKind) -> &'static str {
    match kind {
        ServiceKind::Airtime => "/api/airtime/networks/",
        ServiceKind::Data => "/api/data/networks/",
        ServiceKind::Cable => "/api/cable/providers/",
        ServiceKind::Electricity => "/api/electricity/plans/?identifier=electricity",
    }
}

fn plans_path(kind: ServiceKind) -> Option<&'static str> {
    match kind {
        ServiceKind::Data => Some("/api/data/plans/"),
        ServiceKind::Cable => Some("/api/cable/plans/"),
        ServiceKind::Airtime | ServiceKind::Electricity => None,
    }
}

/// Catalog backed by the provider's listing endpoints.
#[derive(Debug, Clone)]
pub struct HttpProviderCatalog {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl HttpProviderCatalog {
    pub fn new(config: ProviderConfig) -> Result<Self, FulfillmentError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    async fn fetch(&self, url: String, query: Option<(&str, &str)>) -> Option<Value> {
        let mut request = self
            .client
            .get(&url)
            .header(AUTHORIZATION, self.config.credential.header_value())
            .header(ACCEPT, "application/json");
        if let Some(query) = query {
            request = request.query(&[query]);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(%url, error = %e, "catalog fetch failed, serving fallback");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(%url, status = %response.status(), "catalog fetch refused, serving fallback");
            return None;
        }

        match response.json::<Value>().await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!(%url, error = %e, "catalog body unreadable, serving fallback");
                None
            }
        }
    }
}

#[async_trait]
impl ProviderCatalog for HttpProviderCatalog {
    async fn networks(&self, kind: ServiceKind) -> Value {
        let url = self.config.join(networks_path(kind));
        match self.fetch(url, None).await {
            Some(body) => body,
            None => {
                metrics::counter!("catalog_fallbacks_total", "listing" => "networks")
                    .increment(1);
                fallback_networks(kind)
            }
        }
    }

    async fn plans(&self, kind: ServiceKind, key: &str) -> Result<Value, CatalogError> {
        let (Some(path), Some(param)) = (plans_path(kind), plan_query_param(kind)) else {
            return Err(CatalogError::PlansUnsupported(kind));
        };

        let url = self.config.join(path);
        match self.fetch(url, Some((param, key))).await {
            Some(body) => Ok(body),
            None => {
                metrics::counter!("catalog_fallbacks_total", "listing" => "plans").increment(1);
                fallback_plans(kind, key)
            }
        }
    }
}

/// Catalog that only ever serves the built-in listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCatalog;

#[async_trait]
impl ProviderCatalog for StaticCatalog {
    async fn networks(&self, kind: ServiceKind) -> Value {
        fallback_networks(kind)
    }

    async fn plans(&self, kind: ServiceKind, key: &str) -> Result<Value, CatalogError> {
        fallback_plans(kind, key)
    }
}

fn entries(items: &[(&str, &str)]) -> Vec<Value> {
    items
        .iter()
        .map(|(code, name)| json!({ "code": code, "name": name, "status": "active" }))
        .collect()
}

fn priced(items: &[(&str, &str, &str)]) -> Vec<Value> {
    items
        .iter()
        .map(|(code, name, amount)| json!({ "code": code, "name": name, "amount": amount }))
        .collect()
}

/// Built-in network listing for `kind`.
pub fn fallback_networks(kind: ServiceKind) -> Value {
    match kind {
        ServiceKind::Airtime => json!({
            "networks": entries(&[
                ("mtn", "MTN"),
                ("airtel", "Airtel"),
                ("glo", "Globacom"),
                ("9mobile", "9mobile"),
            ])
        }),
        ServiceKind::Data => json!({
            "networks": entries(&[
                ("mtn-data", "MTN Data"),
                ("airtel-data", "Airtel Data"),
                ("glo-data", "Glo Data"),
                ("9mobile-data", "9mobile Data"),
            ])
        }),
        ServiceKind::Cable => json!({
            "providers": entries(&[
                ("dstv", "DSTV"),
                ("gotv", "GOTV"),
                ("startimes", "StarTimes"),
                ("showmax", "Showmax"),
            ])
        }),
        ServiceKind::Electricity => json!({
            "plans": entries(&[
                ("eko-electric", "Eko Electricity (EKEDC)"),
                ("ikeja-electric", "Ikeja Electric (IKEDC)"),
                ("abuja-electric", "Abuja Electricity (AEDC)"),
                ("kano-electric", "Kano Electricity (KEDCO)"),
                ("port-harcourt-electric", "Port Harcourt Electric (PHEDC)"),
                ("jos-electric", "Jos Electricity (JEDC)"),
                ("kaduna-electric", "Kaduna Electric (KAEDCO)"),
                ("benin-electric", "Benin Electricity (BEDC)"),
            ])
        }),
    }
}

/// Built-in plan listing for `key`, or a generic listing for unknown keys.
pub fn fallback_plans(kind: ServiceKind, key: &str) -> Result<Value, CatalogError> {
    let plans = match kind {
        ServiceKind::Data => data_plans(key),
        ServiceKind::Cable => cable_plans(key),
        ServiceKind::Airtime | ServiceKind::Electricity => {
            return Err(CatalogError::PlansUnsupported(kind));
        }
    };
    Ok(json!({ "plans": plans }))
}

fn data_plans(network: &str) -> Vec<Value> {
    let Some(prefix) = network.strip_suffix("-data").filter(|p| {
        matches!(*p, "mtn" | "airtel" | "glo" | "9mobile")
    }) else {
        return priced(&[
            ("default-1gb", "1GB Plan", "500"),
            ("default-5gb", "5GB Plan", "2500"),
        ]);
    };

    [
        ("1gb-daily", "1GB Daily", "500"),
        ("2gb-weekly", "2GB Weekly", "1000"),
        ("5gb-monthly", "5GB Monthly", "2500"),
        ("10gb-monthly", "10GB Monthly", "4000"),
    ]
    .iter()
    .map(|(suffix, name, amount)| {
        json!({ "code": format!("{prefix}-{suffix}"), "name": name, "amount": amount })
    })
    .collect()
}

fn cable_plans(provider: &str) -> Vec<Value> {
    match provider {
        "dstv" => priced(&[
            ("dstv-compact", "DStv Compact", "10500"),
            ("dstv-compact-plus", "DStv Compact Plus", "16600"),
            ("dstv-premium", "DStv Premium", "24500"),
            ("dstv-family", "DStv Family", "4400"),
        ]),
        "gotv" => priced(&[
            ("gotv-smallie", "GOtv Smallie", "1575"),
            ("gotv-jinja", "GOtv Jinja", "3200"),
            ("gotv-jolli", "GOtv Jolli", "4850"),
            ("gotv-max", "GOtv Max", "7200"),
        ]),
        "startimes" => priced(&[
            ("startimes-nova", "StarTimes Nova", "1100"),
            ("startimes-basic", "StarTimes Basic", "2200"),
            ("startimes-smart", "StarTimes Smart", "3200"),
            ("startimes-super", "StarTimes Super", "4900"),
        ]),
        "showmax" => priced(&[
            ("showmax-mobile", "Showmax Mobile", "1450"),
            ("showmax-standard", "Showmax Standard", "2900"),
            ("showmax-pro", "Showmax Pro", "3200"),
        ]),
        _ => priced(&[
            ("default-basic", "Basic Plan", "2000"),
            ("default-premium", "Premium Plan", "5000"),
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_network_shapes() {
        assert_eq!(
            fallback_networks(ServiceKind::Airtime)["networks"]
                .as_array()
                .unwrap()
                .len(),
            4
        );
        assert_eq!(
            fallback_networks(ServiceKind::Cable)["providers"][0]["code"],
            "dstv"
        );
        assert_eq!(
            fallback_networks(ServiceKind::Electricity)["plans"]
                .as_array()
                .unwrap()
                .len(),
            8
        );
    }

    #[test]
    fn test_data_plans_for_known_network() {
        let plans = fallback_plans(ServiceKind::Data, "glo-data").unwrap();
        let plans = plans["plans"].as_array().unwrap();
        assert_eq!(plans.len(), 4);
        assert_eq!(plans[0]["code"], "glo-1gb-daily");
        assert_eq!(plans[3]["amount"], "4000");
    }

    #[test]
    fn test_data_plans_for_unknown_network_are_generic() {
        let plans = fallback_plans(ServiceKind::Data, "other-data").unwrap();
        assert_eq!(plans["plans"][0]["code"], "default-1gb");
    }

    #[test]
    fn test_cable_plans() {
        let plans = fallback_plans(ServiceKind::Cable, "showmax").unwrap();
        assert_eq!(plans["plans"].as_array().unwrap().len(), 3);

        let generic = fallback_plans(ServiceKind::Cable, "unknown").unwrap();
        assert_eq!(generic["plans"][1]["code"], "default-premium");
    }

    #[test]
    fn test_plans_unsupported_for_airtime() {
        assert_eq!(
            fallback_plans(ServiceKind::Airtime, "mtn"),
            Err(CatalogError::PlansUnsupported(ServiceKind::Airtime))
        );
    }

    #[tokio::test]
    async fn test_unreachable_provider_serves_fallback() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let catalog =
            HttpProviderCatalog::new(ProviderConfig::new(format!("http://{addr}"), "key"))
                .unwrap();

        assert_eq!(
            catalog.networks(ServiceKind::Data).await,
            fallback_networks(ServiceKind::Data)
        );
        assert_eq!(
            catalog.plans(ServiceKind::Cable, "gotv").await.unwrap(),
            fallback_plans(ServiceKind::Cable, "gotv").unwrap()
        );
    }
}
