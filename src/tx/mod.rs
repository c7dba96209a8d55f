//! Transaction lifecycle.

pub mod send_money;
pub mod transaction;

pub use send_money::send_money;
pub use transaction::{BroadcastReceipt, Transaction, TransactionRequest, TransactionState};
