//! Ledger domain model: transactions, the append-only ledger, and aggregates.

#[allow(clippy::module_inception)]
pub mod ledger;
pub mod summary;
pub mod transaction;

pub use ledger::{month_days, Ledger};
pub use summary::{category_breakdown, CategoryTotals, Totals};
pub use transaction::{IdSequence, Transaction, TransactionKind};
