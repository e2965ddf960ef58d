//! HTTP API server with observability for the utility purchase service.
//!
//! Exposes the purchase pipeline, the provider catalog and the exchange
//! rate, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod price;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use chain::{ChainReceiptOracle, JsonRpcReceiptOracle, PollingReceiptOracle};
use fulfillment::{FulfillmentGateway, HttpFulfillmentGateway, HttpProviderCatalog, ProviderCatalog};
use metrics_exporter_prometheus::PrometheusHandle;
use purchase::PurchaseOrchestrator;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use error::StartupError;
use price::{CachedPriceFeed, CoinGeckoPriceFeed};

/// Orchestrator over type-erased collaborators, so tests can swap them.
pub type SharedOrchestrator =
    PurchaseOrchestrator<Arc<dyn ChainReceiptOracle>, Arc<dyn FulfillmentGateway>>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub orchestrator: SharedOrchestrator,
    pub catalog: Arc<dyn ProviderCatalog>,
    pub prices: CachedPriceFeed,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/api/purchase", post(routes::purchase::create))
        .route("/api/price", get(routes::price::get))
        .route("/api/{service}/networks", get(routes::catalog::networks))
        .route("/api/{service}/plans", get(routes::catalog::plans))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state backed by the real chain node, provider
/// and price source described by `config`.
pub fn create_default_state(config: &Config) -> Result<Arc<AppState>, StartupError> {
    let oracle: Arc<dyn ChainReceiptOracle> = Arc::new(PollingReceiptOracle::new(
        JsonRpcReceiptOracle::new(config.chain_rpc())?,
        config.confirmation_policy(),
    ));
    let gateway: Arc<dyn FulfillmentGateway> =
        Arc::new(HttpFulfillmentGateway::new(config.provider())?);
    let catalog = HttpProviderCatalog::new(config.provider())?;

    let price_config = config.price_feed();
    let prices = CachedPriceFeed::from_config(
        Arc::new(CoinGeckoPriceFeed::new(&price_config)?),
        &price_config,
    );

    Ok(Arc::new(AppState {
        orchestrator: PurchaseOrchestrator::new(oracle, gateway),
        catalog: Arc::new(catalog),
        prices,
    }))
}
