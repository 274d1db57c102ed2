//! Domain-specific errors for the transaction store.
//!
//! Every variant is an insert rejection. A rejected insert leaves the
//! store untouched. Lookups of unknown ids or types are not errors: they
//! return `None` or an empty set.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Transactions are immutable once stored, so an id can only be inserted once.
    #[error("transaction {0} already exists")]
    DuplicateTransaction(u64),

    /// Id 0 marks a root's missing parent and cannot name a transaction.
    #[error("transaction id 0 is reserved")]
    ReservedId,

    #[error("transaction {0} cannot be its own parent")]
    SelfParent(u64),

    /// The named parent already has this transaction as its parent.
    #[error("transaction {parent} already has transaction {id} as parent")]
    DirectCycle { id: u64, parent: u64 },

    /// The parent chain starting at `parent` leads back to `id`.
    #[error("parent chain of transaction {parent} leads back to transaction {id}")]
    IndirectCycle { id: u64, parent: u64 },
}
