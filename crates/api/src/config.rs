//! Application configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use chain::{ChainRpcConfig, ConfirmationPolicy};
use fulfillment::ProviderConfig;

use crate::price::PriceFeedConfig;

pub const DEFAULT_CHAIN_RPC_URL: &str = "https://rpc.soniclabs.com";
pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://client.peyflex.com.ng";
pub const DEFAULT_PRICE_URL: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=usd-coin&vs_currencies=ngn";

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `CHAIN_RPC_URL`, `CHAIN_RPC_TIMEOUT_SECS`: chain node endpoint
/// - `CONFIRMATION_ATTEMPTS`, `CONFIRMATION_INTERVAL_MS`: receipt polling
/// - `PROVIDER_BASE_URL`, `PROVIDER_API_KEY`, `PROVIDER_AUTH_SCHEME`,
///   `PROVIDER_TIMEOUT_SECS`: billing provider
/// - `PRICE_URL`, `PRICE_FALLBACK_NGN`, `PRICE_TTL_SECS`: exchange rate feed
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,

    pub chain_rpc_url: String,
    pub chain_rpc_timeout: Duration,
    pub confirmation_attempts: u32,
    pub confirmation_interval: Duration,

    pub provider_base_url: String,
    pub provider_api_key: String,
    pub provider_auth_scheme: String,
    pub provider_timeout: Duration,

    pub price_url: String,
    pub price_fallback_ngn: f64,
    pub price_ttl: Duration,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    ///
    /// Unparseable values fall back to the default for that key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let string = |key: &str, default: String| lookup(key).unwrap_or(default);

        Self {
            host: string("HOST", defaults.host),
            port: parsed(&lookup, "PORT").unwrap_or(defaults.port),
            log_level: string("RUST_LOG", defaults.log_level),

            chain_rpc_url: string("CHAIN_RPC_URL", defaults.chain_rpc_url),
            chain_rpc_timeout: parsed(&lookup, "CHAIN_RPC_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.chain_rpc_timeout),
            confirmation_attempts: parsed(&lookup, "CONFIRMATION_ATTEMPTS")
                .unwrap_or(defaults.confirmation_attempts),
            confirmation_interval: parsed(&lookup, "CONFIRMATION_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.confirmation_interval),

            provider_base_url: string("PROVIDER_BASE_URL", defaults.provider_base_url),
            provider_api_key: string("PROVIDER_API_KEY", defaults.provider_api_key),
            provider_auth_scheme: string("PROVIDER_AUTH_SCHEME", defaults.provider_auth_scheme),
            provider_timeout: parsed(&lookup, "PROVIDER_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.provider_timeout),

            price_url: string("PRICE_URL", defaults.price_url),
            price_fallback_ngn: parsed(&lookup, "PRICE_FALLBACK_NGN")
                .filter(|rate: &f64| rate.is_finite() && *rate > 0.0)
                .unwrap_or(defaults.price_fallback_ngn),
            price_ttl: parsed(&lookup, "PRICE_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.price_ttl),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn chain_rpc(&self) -> ChainRpcConfig {
        ChainRpcConfig::new(self.chain_rpc_url.clone()).with_timeout(self.chain_rpc_timeout)
    }

    pub fn confirmation_policy(&self) -> ConfirmationPolicy {
        ConfirmationPolicy::new(self.confirmation_attempts, self.confirmation_interval)
    }

    pub fn provider(&self) -> ProviderConfig {
        ProviderConfig::new(self.provider_base_url.clone(), self.provider_api_key.clone())
            .with_auth_scheme(self.provider_auth_scheme.clone())
            .with_timeout(self.provider_timeout)
    }

    pub fn price_feed(&self) -> PriceFeedConfig {
        PriceFeedConfig {
            url: self.price_url.clone(),
            fallback_rate: self.price_fallback_ngn,
            ttl: self.price_ttl,
            timeout: Duration::from_secs(10),
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|raw| parse_value(key, &raw))
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Option<T> {
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = raw, "ignoring unparseable configuration value");
            None
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),

            chain_rpc_url: DEFAULT_CHAIN_RPC_URL.to_string(),
            chain_rpc_timeout: Duration::from_secs(30),
            confirmation_attempts: 1,
            confirmation_interval: Duration::from_millis(2000),

            provider_base_url: DEFAULT_PROVIDER_BASE_URL.to_string(),
            provider_api_key: String::new(),
            provider_auth_scheme: "Token".to_string(),
            provider_timeout: Duration::from_secs(30),

            price_url: DEFAULT_PRICE_URL.to_string(),
            price_fallback_ngn: 1600.0,
            price_ttl: Duration::from_secs(300),
        }
    }
}
