//! Purchase orchestrator: validate, verify payment, then fulfill.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use chain::ChainReceiptOracle;
use common::PurchaseId;
use fulfillment::{FulfillmentGateway, FulfillmentResult};
use futures_util::FutureExt;
use serde_json::Value;

use crate::error::PurchaseError;
use crate::outcome::PurchaseOutcome;
use crate::request::PurchaseRequest;
use crate::state::{PurchaseProgress, PurchaseState};

/// Drives one purchase from request to [`PurchaseOutcome`].
///
/// Stateless between requests: concurrent calls share nothing but the two
/// collaborators. No order is ever sent to the gateway unless the oracle
/// returned a success verdict for the same request.
pub struct PurchaseOrchestrator<O, G>
where
    O: ChainReceiptOracle,
    G: FulfillmentGateway,
{
    oracle: O,
    gateway: G,
}

impl<O, G> PurchaseOrchestrator<O, G>
where
    O: ChainReceiptOracle,
    G: FulfillmentGateway,
{
    pub fn new(oracle: O, gateway: G) -> Self {
        Self { oracle, gateway }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Processes a purchase request. Never fails: every error, including a
    /// panic in either collaborator, is folded into the returned outcome.
    #[tracing::instrument(
        skip_all,
        fields(
            purchase_id = tracing::field::Empty,
            service_kind = tracing::field::Empty,
            tx_ref = tracing::field::Empty,
        )
    )]
    pub async fn process(&self, request: PurchaseRequest) -> PurchaseOutcome {
        metrics::counter!("purchase_requests_total").increment(1);
        let started = std::time::Instant::now();
        let purchase_id = PurchaseId::new();
        tracing::Span::current().record("purchase_id", tracing::field::display(purchase_id));

        let mut progress = PurchaseProgress::new();
        let result = AssertUnwindSafe(self.run(&request, &mut progress))
            .catch_unwind()
            .await;

        let tx_ref = request.tx_ref();
        let outcome = match result {
            Ok(Ok(data)) => match tx_ref {
                Some(tx_ref) => PurchaseOutcome::delivered(purchase_id, tx_ref, data),
                None => PurchaseOutcome::failed(
                    purchase_id,
                    None,
                    &PurchaseError::InternalFault("delivered without a transaction".into()),
                    progress.payment_confirmed(),
                ),
            },
            Ok(Err(err)) => {
                PurchaseOutcome::failed(purchase_id, tx_ref, &err, progress.payment_confirmed())
            }
            Err(panic) => {
                let err = PurchaseError::InternalFault(panic_message(panic.as_ref()));
                tracing::error!(
                    state = %progress.state(),
                    error = %err,
                    "purchase panicked"
                );
                PurchaseOutcome::failed(purchase_id, tx_ref, &err, progress.payment_confirmed())
            }
        };

        metrics::counter!("purchase_outcomes_total", "code" => outcome.label()).increment(1);
        metrics::histogram!("purchase_duration_seconds").record(started.elapsed().as_secs_f64());

        if outcome.is_success() {
            tracing::info!(state = %progress.state(), "purchase delivered");
        } else {
            tracing::info!(
                state = %progress.state(),
                code = outcome.label(),
                payment_confirmed = outcome.payment_confirmed,
                "purchase failed"
            );
        }

        outcome
    }

    async fn run(
        &self,
        request: &PurchaseRequest,
        progress: &mut PurchaseProgress,
    ) -> Result<Value, PurchaseError> {
        // 1. Validate, no network traffic
        progress.advance(PurchaseState::Validating)?;
        let purchase = match request.validate() {
            Ok(purchase) => purchase,
            Err(err) => {
                progress.advance(PurchaseState::Invalid)?;
                tracing::debug!(error = %err, "purchase request rejected");
                return Err(err);
            }
        };

        let span = tracing::Span::current();
        span.record("service_kind", purchase.kind.as_str());
        span.record("tx_ref", purchase.tx_ref.as_str());

        // 2. Verify the chain receipt
        progress.advance(PurchaseState::Verifying)?;
        let verdict = self.oracle.verify(&purchase.tx_ref).await;
        if !verdict.is_success() {
            progress.advance(PurchaseState::Unverified)?;
            tracing::warn!(verdict = %verdict, "payment not confirmed, nothing fulfilled");
            return Err(PurchaseError::PaymentNotConfirmed {
                tx_ref: purchase.tx_ref,
                verdict,
            });
        }

        // 3. Fulfill, only after a confirmed payment
        progress.advance(PurchaseState::Fulfilling)?;
        match self.gateway.fulfill(purchase.kind, &purchase.details).await {
            FulfillmentResult::Delivered(data) => {
                progress.advance(PurchaseState::Delivered)?;
                Ok(data)
            }
            FulfillmentResult::Rejected(rejection) => {
                progress.advance(PurchaseState::FulfillmentRejected)?;
                tracing::error!(
                    reason = rejection.reason.as_str(),
                    message = %rejection.message,
                    "payment confirmed but order not fulfilled, needs reconciliation"
                );
                Err(PurchaseError::FulfillmentRejected {
                    tx_ref: purchase.tx_ref,
                    reason: rejection.reason,
                    message: rejection.message,
                })
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
