use chain::InMemoryReceiptOracle;
use common::OrderDetails;
use criterion::{Criterion, criterion_group, criterion_main};
use fulfillment::InMemoryFulfillmentGateway;
use purchase::{PurchaseOrchestrator, PurchaseRequest};

fn airtime_request() -> PurchaseRequest {
    PurchaseRequest::new(
        "airtime",
        OrderDetails::new()
            .with("network", "mtn")
            .with("phone", "08012345678")
            .with("amount", "500"),
        "0xbench",
    )
}

fn bench_validate(c: &mut Criterion) {
    let request = airtime_request();

    c.bench_function("purchase/validate", |b| {
        b.iter(|| request.validate().unwrap());
    });
}

fn bench_process_delivered(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let orchestrator = PurchaseOrchestrator::new(
        InMemoryReceiptOracle::confirming(),
        InMemoryFulfillmentGateway::new(),
    );

    c.bench_function("purchase/process_delivered", |b| {
        b.iter(|| {
            rt.block_on(async {
                let outcome = orchestrator.process(airtime_request()).await;
                assert!(outcome.is_success());
            });
        });
    });
}

fn bench_process_rejected_request(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let orchestrator = PurchaseOrchestrator::new(
        InMemoryReceiptOracle::confirming(),
        InMemoryFulfillmentGateway::new(),
    );

    c.bench_function("purchase/process_missing_parameters", |b| {
        b.iter(|| {
            rt.block_on(async {
                let outcome = orchestrator.process(PurchaseRequest::default()).await;
                assert!(!outcome.is_success());
            });
        });
    });
}

criterion_group!(
    benches,
    bench_validate,
    bench_process_delivered,
    bench_process_rejected_request
);
criterion_main!(benches);
