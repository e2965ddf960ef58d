//! USD-Coin to Naira exchange rate, cached with a fallback.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::{PriceError, StartupError};

#[derive(Debug, Clone)]
pub struct PriceFeedConfig {
    pub url: String,
    pub fallback_rate: f64,
    pub ttl: Duration,
    pub timeout: Duration,
}

/// A source of the current USD-Coin to NGN rate.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn usdc_to_ngn(&self) -> Result<f64, PriceError>;
}

#[async_trait]
impl<T: PriceFeed + ?Sized> PriceFeed for Arc<T> {
    async fn usdc_to_ngn(&self) -> Result<f64, PriceError> {
        (**self).usdc_to_ngn().await
    }
}

/// Reads the rate from CoinGecko's simple-price endpoint.
#[derive(Debug, Clone)]
pub struct CoinGeckoPriceFeed {
    url: String,
    client: reqwest::Client,
}

impl CoinGeckoPriceFeed {
    pub fn new(config: &PriceFeedConfig) -> Result<Self, StartupError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(StartupError::PriceFeed)?;
        Ok(Self {
            url: config.url.clone(),
            client,
        })
    }
}

#[async_trait]
impl PriceFeed for CoinGeckoPriceFeed {
    async fn usdc_to_ngn(&self) -> Result<f64, PriceError> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(PriceError::Status(response.status().as_u16()));
        }

        let body: Value = response.json().await?;
        body.get("usd-coin")
            .and_then(|coin| coin.get("ngn"))
            .and_then(Value::as_f64)
            .filter(|rate| rate.is_finite() && *rate > 0.0)
            .ok_or_else(|| PriceError::Malformed(body.to_string()))
    }
}

/// Fixed rate, for tests and offline runs.
#[derive(Debug, Clone, Copy)]
pub struct StaticPriceFeed(pub f64);

#[async_trait]
impl PriceFeed for StaticPriceFeed {
    async fn usdc_to_ngn(&self) -> Result<f64, PriceError> {
        Ok(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub usdc_to_ngn: f64,
    pub timestamp: DateTime<Utc>,
    /// True when the source could not be read and the fallback rate is served.
    pub fallback: bool,
}

/// Caches a [`PriceFeed`] answer for a fixed time.
///
/// Failures are not cached: the next request tries the source again.
pub struct CachedPriceFeed {
    source: Arc<dyn PriceFeed>,
    ttl: Duration,
    fallback_rate: f64,
    cached: RwLock<Option<(PriceQuote, Instant)>>,
}

impl CachedPriceFeed {
    pub fn new(source: Arc<dyn PriceFeed>, ttl: Duration, fallback_rate: f64) -> Self {
        Self {
            source,
            ttl,
            fallback_rate,
            cached: RwLock::new(None),
        }
    }

    pub fn from_config(source: Arc<dyn PriceFeed>, config: &PriceFeedConfig) -> Self {
        Self::new(source, config.ttl, config.fallback_rate)
    }

    pub async fn quote(&self) -> PriceQuote {
        if let Some((quote, fetched_at)) = *self.cached.read().await {
            if fetched_at.elapsed() < self.ttl {
                return quote;
            }
        }

        let mut cached = self.cached.write().await;
        // Another request may have refreshed while we waited for the lock.
        if let Some((quote, fetched_at)) = *cached {
            if fetched_at.elapsed() < self.ttl {
                return quote;
            }
        }

        match self.source.usdc_to_ngn().await {
            Ok(rate) => {
                let quote = PriceQuote {
                    usdc_to_ngn: rate,
                    timestamp: Utc::now(),
                    fallback: false,
                };
                *cached = Some((quote, Instant::now()));
                quote
            }
            Err(e) => {
                tracing::warn!(error = %e, fallback = self.fallback_rate, "price feed unavailable");
                metrics::counter!("price_fallbacks_total").increment(1);
                PriceQuote {
                    usdc_to_ngn: self.fallback_rate,
                    timestamp: Utc::now(),
                    fallback: true,
                }
            }
        }
    }
}
