//! Bounded re-querying to absorb finality lag.

use std::time::Duration;

use async_trait::async_trait;
use common::TxRef;

use crate::oracle::ChainReceiptOracle;
use crate::verdict::ReceiptVerdict;

/// How many lookups a verification may spend before giving up.
///
/// The default is a single lookup with no waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    /// Total lookups, including the first. Values below 1 are treated as 1.
    pub max_attempts: u32,
    /// Pause between consecutive lookups.
    pub interval: Duration,
}

impl ConfirmationPolicy {
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            interval: Duration::ZERO,
        }
    }

    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
        }
    }
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self::single_attempt()
    }
}

/// Wraps an oracle and re-queries while the verdict is indeterminate.
///
/// Success and Failed are final and returned immediately.
#[derive(Debug, Clone)]
pub struct PollingReceiptOracle<O> {
    inner: O,
    policy: ConfirmationPolicy,
}

impl<O: ChainReceiptOracle> PollingReceiptOracle<O> {
    pub fn new(inner: O, policy: ConfirmationPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> ConfirmationPolicy {
        self.policy
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }
}

#[async_trait]
impl<O: ChainReceiptOracle> ChainReceiptOracle for PollingReceiptOracle<O> {
    async fn verify(&self, tx_ref: &TxRef) -> ReceiptVerdict {
        let attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let verdict = self.inner.verify(tx_ref).await;
            if !verdict.is_indeterminate() || attempt >= attempts {
                return verdict;
            }

            tracing::debug!(
                %tx_ref,
                attempt,
                max_attempts = attempts,
                verdict = %verdict,
                "receipt indeterminate, polling again"
            );
            tokio::time::sleep(self.policy.interval).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryReceiptOracle;
    use crate::verdict::IndeterminateCause;

    fn tx() -> TxRef {
        TxRef::parse("0xfeed").unwrap()
    }

    #[tokio::test]
    async fn default_policy_looks_up_once() {
        let inner = InMemoryReceiptOracle::new();
        let oracle = PollingReceiptOracle::new(inner.clone(), ConfirmationPolicy::default());

        let verdict = oracle.verify(&tx()).await;

        assert_eq!(
            verdict,
            ReceiptVerdict::Indeterminate(IndeterminateCause::NotFound)
        );
        assert_eq!(inner.call_count(), 1);
    }

    #[tokio::test]
    async fn polls_until_attempts_exhausted() {
        let inner = InMemoryReceiptOracle::new();
        let oracle = PollingReceiptOracle::new(
            inner.clone(),
            ConfirmationPolicy::new(3, Duration::from_millis(1)),
        );

        let verdict = oracle.verify(&tx()).await;

        assert!(verdict.is_indeterminate());
        assert_eq!(inner.call_count(), 3);
    }

    #[tokio::test]
    async fn stops_as_soon_as_receipt_is_final() {
        let inner = InMemoryReceiptOracle::new();
        inner.push_sequence(
            &tx(),
            vec![
                ReceiptVerdict::Indeterminate(IndeterminateCause::NotFound),
                ReceiptVerdict::Success,
            ],
        );
        let oracle = PollingReceiptOracle::new(
            inner.clone(),
            ConfirmationPolicy::new(5, Duration::from_millis(1)),
        );

        assert_eq!(oracle.verify(&tx()).await, ReceiptVerdict::Success);
        assert_eq!(inner.call_count(), 2);
    }

    #[tokio::test]
    async fn failed_is_not_retried() {
        let inner = InMemoryReceiptOracle::new();
        inner.set_verdict(
            &tx(),
            ReceiptVerdict::Failed {
                status: "0x0".into(),
            },
        );
        let oracle = PollingReceiptOracle::new(
            inner.clone(),
            ConfirmationPolicy::new(5, Duration::from_millis(1)),
        );

        assert!(matches!(
            oracle.verify(&tx()).await,
            ReceiptVerdict::Failed { .. }
        ));
        assert_eq!(inner.call_count(), 1);
    }

    #[test]
    fn zero_attempts_clamped_to_one() {
        assert_eq!(ConfirmationPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }
}
