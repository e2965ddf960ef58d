//! Integration tests for the JSON-RPC receipt oracle against a local mock node.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::http::{StatusCode, header};
use axum::routing::post;
use chain::{
    ChainReceiptOracle, ChainRpcConfig, ConfirmationPolicy, IndeterminateCause,
    JsonRpcReceiptOracle, PollingReceiptOracle, ReceiptVerdict,
};
use common::TxRef;
use serde_json::{Value, json};

async fn spawn_node(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A node that answers every request with the given status and raw body.
async fn spawn_static_node(status: StatusCode, body: &'static str) -> String {
    let router = Router::new().route(
        "/",
        post(move || async move {
            (status, [(header::CONTENT_TYPE, "application/json")], body)
        }),
    );
    spawn_node(router).await
}

fn oracle(url: String) -> JsonRpcReceiptOracle {
    JsonRpcReceiptOracle::new(ChainRpcConfig::new(url).with_timeout(Duration::from_millis(300)))
        .unwrap()
}

fn tx() -> TxRef {
    TxRef::parse("0xabc123").unwrap()
}

#[tokio::test]
async fn test_verdict_table() {
    let cases: Vec<(&str, StatusCode, &'static str, fn(&ReceiptVerdict) -> bool)> = vec![
        (
            "success sentinel",
            StatusCode::OK,
            r#"{"jsonrpc":"2.0","id":1,"result":{"status":"0x1","blockNumber":"0x2a"}}"#,
            |v: &ReceiptVerdict| *v == ReceiptVerdict::Success,
        ),
        (
            "failure sentinel",
            StatusCode::OK,
            r#"{"jsonrpc":"2.0","id":1,"result":{"status":"0x0","blockNumber":"0x2a"}}"#,
            |v: &ReceiptVerdict| matches!(v, ReceiptVerdict::Failed { status } if status == "0x0"),
        ),
        (
            "null receipt",
            StatusCode::OK,
            r#"{"jsonrpc":"2.0","id":1,"result":null}"#,
            |v: &ReceiptVerdict| *v == ReceiptVerdict::Indeterminate(IndeterminateCause::NotFound),
        ),
        (
            "rpc error object",
            StatusCode::OK,
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"unavailable"}}"#,
            |v: &ReceiptVerdict| {
                matches!(
                    v,
                    ReceiptVerdict::Indeterminate(IndeterminateCause::RpcError { code: -32000, .. })
                )
            },
        ),
        (
            "malformed body",
            StatusCode::OK,
            "<html>bad gateway</html>",
            |v: &ReceiptVerdict| {
                matches!(
                    v,
                    ReceiptVerdict::Indeterminate(IndeterminateCause::Malformed { .. })
                )
            },
        ),
        (
            "http error",
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"jsonrpc":"2.0","id":1,"result":{"status":"0x1"}}"#,
            |v: &ReceiptVerdict| {
                matches!(
                    v,
                    ReceiptVerdict::Indeterminate(IndeterminateCause::Transport { .. })
                )
            },
        ),
    ];

    for (name, status, body, expected) in cases {
        let url = spawn_static_node(status, body).await;
        let verdict = oracle(url).verify(&tx()).await;
        assert!(expected(&verdict), "case '{name}' produced {verdict:?}");
    }
}

#[tokio::test]
async fn test_transport_timeout_is_indeterminate() {
    let router = Router::new().route(
        "/",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            r#"{"jsonrpc":"2.0","id":1,"result":{"status":"0x1"}}"#
        }),
    );
    let url = spawn_node(router).await;

    let verdict = oracle(url).verify(&tx()).await;

    assert!(
        matches!(
            verdict,
            ReceiptVerdict::Indeterminate(IndeterminateCause::Transport { .. })
        ),
        "timeout produced {verdict:?}"
    );
}

#[tokio::test]
async fn test_connection_refused_is_indeterminate() {
    // Bind then drop to get a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let verdict = oracle(format!("http://{addr}")).verify(&tx()).await;

    assert!(verdict.is_indeterminate());
}

#[tokio::test]
async fn test_sends_single_receipt_request() {
    let seen: Arc<Mutex<Vec<Value>>> = Arc::default();
    let recorder = seen.clone();
    let router = Router::new().route(
        "/",
        post(move |Json(body): Json<Value>| {
            let recorder = recorder.clone();
            async move {
                recorder.lock().unwrap().push(body);
                Json(json!({"jsonrpc": "2.0", "id": 1, "result": {"status": "0x1"}}))
            }
        }),
    );
    let url = spawn_node(router).await;

    let verdict = oracle(url).verify(&tx()).await;

    assert!(verdict.is_success());
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0]["method"], "eth_getTransactionReceipt");
    assert_eq!(seen[0]["params"], json!(["0xabc123"]));
    assert_eq!(seen[0]["jsonrpc"], "2.0");
}

#[tokio::test]
async fn test_polling_absorbs_mining_delay() {
    let hits: Arc<Mutex<u32>> = Arc::default();
    let counter = hits.clone();
    let router = Router::new().route(
        "/",
        post(move || {
            let counter = counter.clone();
            async move {
                let mut n = counter.lock().unwrap();
                *n += 1;
                if *n < 3 {
                    Json(json!({"jsonrpc": "2.0", "id": 1, "result": null}))
                } else {
                    Json(json!({"jsonrpc": "2.0", "id": 1, "result": {"status": "0x1"}}))
                }
            }
        }),
    );
    let url = spawn_node(router).await;

    let polling = PollingReceiptOracle::new(
        oracle(url),
        ConfirmationPolicy::new(4, Duration::from_millis(10)),
    );

    assert!(polling.verify(&tx()).await.is_success());
    assert_eq!(*hits.lock().unwrap(), 3);
}
