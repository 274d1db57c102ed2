//! Storage layer for the transaction tree. Provides storage for:
//! - Transactions and their parent/child links ([`TransactionsStore`])
//! - The type label index ([`TypesIndex`])
//!
//! Both are safe to share between threads; nothing here performs I/O.

mod transactions;
mod types;

pub use transactions::TransactionsStore;
pub use types::TypesIndex;
