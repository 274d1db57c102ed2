//! The transaction store consumed by callers: insert, lookup by id, lookup by
//! type and subtree sums. One `Engine` is created up front and shared, e.g.
//! behind an `Arc`, by every task that needs it.

use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::dto::{SumRow, Transaction, TypeRow};
use crate::stores::{TransactionsStore, TypesIndex};
use crate::Error;

#[derive(Default)]
pub struct Engine {
    transactions: TransactionsStore,
    types: TypesIndex,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            transactions: TransactionsStore::new(),
            types: TypesIndex::new(),
        }
    }

    /// Stores a new transaction. Either the transaction is stored, linked and
    /// indexed by type, or an error is returned and nothing changes.
    pub fn insert(&self, transaction: Transaction) -> Result<(), Error> {
        let id = transaction.id;
        let tx_type = transaction.tx_type.clone();
        if let Err(err) = self.transactions.insert(transaction) {
            warn!(id, %err, "rejected transaction");
            return Err(err);
        }
        // Not atomic with the linkage above; nothing reads both together.
        self.types.add(&tx_type, id);
        Ok(())
    }

    pub fn get(&self, id: u64) -> Option<Transaction> {
        self.transactions.get(id)
    }

    pub fn ids_by_type(&self, tx_type: &str) -> BTreeSet<u64> {
        self.types.ids(tx_type)
    }

    pub fn sum(&self, id: u64) -> f64 {
        let sum = self.transactions.sum(id);
        debug!(id, sum, "computed sum");
        sum
    }

    pub fn children(&self, id: u64) -> Option<BTreeSet<u64>> {
        self.transactions.children(id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Every type label seen so far, in ascending order.
    pub fn types(&self) -> Vec<String> {
        self.types.labels()
    }

    /// One report row per stored transaction, ordered by id.
    pub fn sums(&self) -> impl Iterator<Item = SumRow> + '_ {
        self.transactions.ids().into_iter().filter_map(move |id| {
            let transaction = self.get(id)?;
            Some(SumRow::new(transaction, self.sum(id)))
        })
    }

    /// One report row per type label, ordered by label.
    pub fn type_rows(&self) -> impl Iterator<Item = TypeRow> + '_ {
        self.types().into_iter().map(move |tx_type| {
            let ids = self.ids_by_type(&tx_type);
            TypeRow::new(tx_type, &ids)
        })
    }
}
