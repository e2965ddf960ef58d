//! Scripted in-memory oracle for tests and local runs.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::TxRef;

use crate::oracle::ChainReceiptOracle;
use crate::verdict::{IndeterminateCause, ReceiptVerdict};

#[derive(Debug)]
struct InMemoryOracleState {
    scripted: HashMap<TxRef, VecDeque<ReceiptVerdict>>,
    default_verdict: ReceiptVerdict,
    calls: Vec<TxRef>,
}

impl Default for InMemoryOracleState {
    fn default() -> Self {
        Self {
            scripted: HashMap::new(),
            default_verdict: ReceiptVerdict::Indeterminate(IndeterminateCause::NotFound),
            calls: Vec::new(),
        }
    }
}

/// In-memory receipt oracle with per-transaction scripted verdicts.
///
/// Unknown hashes resolve to the default verdict, which starts out as
/// "receipt not found". Every lookup is recorded.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReceiptOracle {
    state: Arc<RwLock<InMemoryOracleState>>,
}

impl InMemoryReceiptOracle {
    /// Creates an oracle that knows no transactions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an oracle that confirms every transaction.
    pub fn confirming() -> Self {
        let oracle = Self::new();
        oracle.set_default_verdict(ReceiptVerdict::Success);
        oracle
    }

    /// Fixes the verdict returned for `tx_ref`.
    pub fn set_verdict(&self, tx_ref: &TxRef, verdict: ReceiptVerdict) {
        self.push_sequence(tx_ref, vec![verdict]);
    }

    /// Scripts successive verdicts for `tx_ref`; the last one repeats.
    pub fn push_sequence(&self, tx_ref: &TxRef, verdicts: Vec<ReceiptVerdict>) {
        self.state
            .write()
            .unwrap()
            .scripted
            .insert(tx_ref.clone(), verdicts.into());
    }

    /// Sets the verdict for hashes that have no script.
    pub fn set_default_verdict(&self, verdict: ReceiptVerdict) {
        self.state.write().unwrap().default_verdict = verdict;
    }

    /// Returns the total number of lookups performed.
    pub fn call_count(&self) -> usize {
        self.state.read().unwrap().calls.len()
    }

    /// Returns the number of lookups performed for `tx_ref`.
    pub fn calls_for(&self, tx_ref: &TxRef) -> usize {
        self.state
            .read()
            .unwrap()
            .calls
            .iter()
            .filter(|t| *t == tx_ref)
            .count()
    }
}

#[async_trait]
impl ChainReceiptOracle for InMemoryReceiptOracle {
    async fn verify(&self, tx_ref: &TxRef) -> ReceiptVerdict {
        let mut state = self.state.write().unwrap();
        state.calls.push(tx_ref.clone());

        let scripted = match state.scripted.get_mut(tx_ref) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        scripted.unwrap_or_else(|| state.default_verdict.clone())
    }
}
