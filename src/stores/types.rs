use dashmap::DashMap;
use std::collections::BTreeSet;

/// Secondary index from type label to the ids of the transactions carrying it.
/// A transaction lands in exactly one bucket, fixed at insertion.
#[derive(Default)]
pub struct TypesIndex {
    types: DashMap<String, BTreeSet<u64>>,
}

impl TypesIndex {
    pub fn new() -> Self {
        Self {
            types: DashMap::new(),
        }
    }

    /// Adds `id` to the bucket for `tx_type`, creating the bucket if needed.
    pub fn add(&self, tx_type: &str, id: u64) {
        if let Some(mut ids) = self.types.get_mut(tx_type) {
            ids.insert(id);
            return;
        }
        self.types.entry(tx_type.to_owned()).or_default().insert(id);
    }

    /// All type labels, ascending.
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.types.iter().map(|bucket| bucket.key().clone()).collect();
        labels.sort_unstable();
        labels
    }

    /// Ids sharing `tx_type`; empty when the type was never seen.
    pub fn ids(&self, tx_type: &str) -> BTreeSet<u64> {
        self.types
            .get(tx_type)
            .map(|ids| ids.value().clone())
            .unwrap_or_default()
    }
}
