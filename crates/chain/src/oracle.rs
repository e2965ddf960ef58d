//! The receipt oracle seam.

use std::sync::Arc;

use async_trait::async_trait;
use common::TxRef;

use crate::verdict::ReceiptVerdict;

/// Classifies the on-chain outcome of a transaction.
///
/// Implementations must fail closed: any error during the lookup is reported
/// as [`ReceiptVerdict::Indeterminate`], never as success.
#[async_trait]
pub trait ChainReceiptOracle: Send + Sync {
    /// Looks up the receipt for `tx_ref` and classifies it.
    async fn verify(&self, tx_ref: &TxRef) -> ReceiptVerdict;
}

#[async_trait]
impl<T: ChainReceiptOracle + ?Sized> ChainReceiptOracle for Arc<T> {
    async fn verify(&self, tx_ref: &TxRef) -> ReceiptVerdict {
        (**self).verify(tx_ref).await
    }
}
