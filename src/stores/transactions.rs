//! Primary transaction table and parent/child linkage.
//!
//! Transactions live in a concurrent map keyed by id, so lookups never wait
//! on inserts. The children of every stored transaction live in a separate
//! table behind one reader/writer lock:
//! - inserts take the write lock while they check, store and link a transaction
//! - sum traversals take the read lock for the whole walk of a subtree
//!
//! A sum therefore never sees a transaction whose children are half linked.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, trace};

use crate::dto::{Transaction, NO_PARENT};
use crate::Error;

type Children = HashMap<u64, BTreeSet<u64>>;

#[derive(Default)]
pub struct TransactionsStore {
    transactions: DashMap<u64, Transaction>,
    /// Keyed by stored transaction id only; a child naming a parent that does
    /// not exist yet is linked when that parent is inserted.
    children: RwLock<Children>,
}

impl TransactionsStore {
    pub fn new() -> Self {
        Self {
            transactions: DashMap::new(),
            children: RwLock::new(HashMap::new()),
        }
    }

    /// Stores a new transaction and links it into the parent/child tree.
    ///
    /// Id `0` is the root sentinel and always rejected. Other rejections, in
    /// the order they are checked:
    /// 1. the id is already stored
    /// 2. the parent already has this transaction as its parent, or its parent
    ///    chain otherwise leads back to this transaction
    /// 3. the transaction names itself as parent
    ///
    /// A rejected insert leaves the store untouched.
    pub fn insert(&self, transaction: Transaction) -> Result<(), Error> {
        let id = transaction.id;
        let parent_id = transaction.parent_id;
        let is_root = transaction.is_root();

        if id == NO_PARENT {
            return Err(Error::ReservedId);
        }
        if self.transactions.contains_key(&id) {
            return Err(Error::DuplicateTransaction(id));
        }

        // The write lock covers the cycle checks and the put as well as the
        // linkage. Inserts are serialized from here on, so two racing inserts
        // cannot both pass the duplicate or cycle checks (e.g. 1 under 2 and
        // 2 under 1 at the same time).
        let mut children = self.children.write();

        if !is_root {
            self.check_ancestry(id, parent_id)?;
        }
        if parent_id == id {
            return Err(Error::SelfParent(id));
        }

        match self.transactions.entry(id) {
            Entry::Occupied(_) => return Err(Error::DuplicateTransaction(id)),
            Entry::Vacant(entry) => {
                entry.insert(transaction);
            }
        }

        if !is_root {
            if let Some(siblings) = children.get_mut(&parent_id) {
                siblings.insert(id);
            }
        }

        // Resolve transactions stored earlier that named this id as parent.
        let waiting: BTreeSet<u64> = self
            .transactions
            .iter()
            .filter(|stored| stored.parent_id == id)
            .map(|stored| *stored.key())
            .collect();
        if !waiting.is_empty() {
            trace!(id, resolved = waiting.len(), "linked forward references");
        }
        children.entry(id).or_default().extend(waiting);

        debug!(id, parent_id, "stored transaction");
        Ok(())
    }

    /// Walks up the parent chain starting at `parent_id` and fails if it
    /// reaches `id`. Stops at the first ancestor that is not stored yet.
    fn check_ancestry(&self, id: u64, parent_id: u64) -> Result<(), Error> {
        let mut current = parent_id;
        // Every stored chain is acyclic, so it cannot be longer than the table.
        for depth in 0..self.transactions.len() {
            let Some(next) = self.transactions.get(&current).map(|t| t.parent_id) else {
                return Ok(());
            };
            if next == id {
                return Err(if depth == 0 {
                    Error::DirectCycle {
                        id,
                        parent: parent_id,
                    }
                } else {
                    Error::IndirectCycle {
                        id,
                        parent: parent_id,
                    }
                });
            }
            if next == NO_PARENT {
                return Ok(());
            }
            current = next;
        }
        Ok(())
    }

    pub fn get(&self, id: u64) -> Option<Transaction> {
        self.transactions.get(&id).map(|stored| stored.value().clone())
    }

    /// Returns the ids currently linked as children of `id`.
    pub fn children(&self, id: u64) -> Option<BTreeSet<u64>> {
        self.children.read().get(&id).cloned()
    }

    /// Sum of the amount of `id` and of all its transitive children.
    /// Unknown ids sum to zero.
    pub fn sum(&self, id: u64) -> f64 {
        let children = self.children.read();
        if !self.transactions.contains_key(&id) {
            return 0.0;
        }

        // Explicit stack so a long chain cannot overflow the call stack.
        let mut sum = 0.0;
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(amount) = self.transactions.get(&current).map(|t| t.amount) {
                sum += amount;
            }
            if let Some(kids) = children.get(&current) {
                pending.extend(kids.iter().rev());
            }
        }
        sum
    }

    /// All stored ids in ascending order.
    pub fn ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.transactions.iter().map(|stored| *stored.key()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
