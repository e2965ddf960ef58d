//! Chain receipt verification.
//!
//! Answers one question for the purchase pipeline: has the transfer behind a
//! transaction hash been finalized successfully? Anything short of a receipt
//! whose status is the success sentinel is reported as not confirmed, and a
//! lookup that cannot complete is never mistaken for a failed transfer.

pub mod error;
pub mod memory;
pub mod oracle;
pub mod polling;
pub mod rpc;
pub mod verdict;

pub use error::ChainError;
pub use memory::InMemoryReceiptOracle;
pub use oracle::ChainReceiptOracle;
pub use polling::{ConfirmationPolicy, PollingReceiptOracle};
pub use rpc::{ChainRpcConfig, JsonRpcReceiptOracle, SUCCESS_STATUS};
pub use verdict::{IndeterminateCause, ReceiptVerdict};
