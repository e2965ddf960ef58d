//! Shared value types for the utility purchase service.

pub mod types;

pub use types::{OrderDetails, PurchaseId, ServiceKind, TxRef, UnknownServiceKind};
