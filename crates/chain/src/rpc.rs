//! JSON-RPC receipt oracle for EVM-compatible nodes.

use std::time::Duration;

use async_trait::async_trait;
use common::TxRef;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ChainError;
use crate::oracle::ChainReceiptOracle;
use crate::verdict::{IndeterminateCause, ReceiptVerdict};

/// Receipt status meaning "execution succeeded".
pub const SUCCESS_STATUS: &str = "0x1";

const RECEIPT_METHOD: &str = "eth_getTransactionReceipt";

/// Connection settings for the chain node.
#[derive(Debug, Clone)]
pub struct ChainRpcConfig {
    /// JSON-RPC endpoint URL.
    pub url: String,
    /// Per-request timeout; a timed-out lookup is indeterminate.
    pub timeout: Duration,
}

impl ChainRpcConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    params: [&'a str; 1],
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct TransactionReceipt {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    block_number: Option<String>,
}

/// Oracle that issues a single `eth_getTransactionReceipt` per lookup.
#[derive(Debug, Clone)]
pub struct JsonRpcReceiptOracle {
    config: ChainRpcConfig,
    client: reqwest::Client,
}

impl JsonRpcReceiptOracle {
    /// Creates an oracle for the node at `config.url`.
    pub fn new(config: ChainRpcConfig) -> Result<Self, ChainError> {
        reqwest::Url::parse(&config.url)
            .map_err(|e| ChainError::Config(format!("invalid RPC url {}: {e}", config.url)))?;

        tracing::info!(url = %config.url, timeout = ?config.timeout, "initializing chain RPC oracle");

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ChainRpcConfig {
        &self.config
    }

    async fn lookup(&self, tx_ref: &TxRef) -> ReceiptVerdict {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method: RECEIPT_METHOD,
            params: [tx_ref.as_str()],
            id: 1,
        };

        let response = match self.client.post(&self.config.url).json(&request).send().await {
            Ok(response) => response,
            Err(e) => return ReceiptVerdict::transport(format!("HTTP request failed: {e}")),
        };

        let status = response.status();
        if !status.is_success() {
            return ReceiptVerdict::transport(format!("node returned HTTP {status}"));
        }

        match response.json::<Value>().await {
            Ok(body) => classify_response(body),
            Err(e) if e.is_decode() => {
                ReceiptVerdict::malformed(format!("failed to parse response: {e}"))
            }
            Err(e) => ReceiptVerdict::transport(format!("failed to read response: {e}")),
        }
    }
}

#[async_trait]
impl ChainReceiptOracle for JsonRpcReceiptOracle {
    #[tracing::instrument(skip_all, fields(tx_ref = %tx_ref))]
    async fn verify(&self, tx_ref: &TxRef) -> ReceiptVerdict {
        let started = std::time::Instant::now();
        let verdict = self.lookup(tx_ref).await;

        metrics::counter!("chain_verifications_total", "verdict" => verdict.as_str())
            .increment(1);
        metrics::histogram!("chain_verification_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        match &verdict {
            ReceiptVerdict::Success => tracing::debug!("receipt confirmed"),
            other => tracing::warn!(verdict = %other, "receipt not confirmed"),
        }

        verdict
    }
}

/// Classifies a decoded JSON-RPC response body.
fn classify_response(body: Value) -> ReceiptVerdict {
    let Value::Object(mut body) = body else {
        return ReceiptVerdict::malformed("response is not a JSON object");
    };

    if let Some(error) = body.remove("error").filter(|e| !e.is_null()) {
        return match serde_json::from_value::<JsonRpcError>(error) {
            Ok(error) => ReceiptVerdict::Indeterminate(IndeterminateCause::RpcError {
                code: error.code,
                message: error.message,
            }),
            Err(e) => ReceiptVerdict::malformed(format!("unreadable error object: {e}")),
        };
    }

    let receipt = match body.remove("result") {
        None => return ReceiptVerdict::malformed("response has neither result nor error"),
        Some(Value::Null) => return ReceiptVerdict::Indeterminate(IndeterminateCause::NotFound),
        Some(result) => result,
    };

    match serde_json::from_value::<TransactionReceipt>(receipt) {
        Ok(receipt) => classify_receipt(&receipt),
        Err(e) => ReceiptVerdict::malformed(format!("unreadable receipt: {e}")),
    }
}

fn classify_receipt(receipt: &TransactionReceipt) -> ReceiptVerdict {
    match receipt.status.as_deref() {
        Some(SUCCESS_STATUS) => {
            tracing::debug!(block = ?receipt.block_number, "receipt status success");
            ReceiptVerdict::Success
        }
        Some(other) => ReceiptVerdict::Failed {
            status: other.to_string(),
        },
        None => ReceiptVerdict::Failed {
            status: "missing".to_string(),
        },
    }
}
