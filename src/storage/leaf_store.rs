//! Page store: the authoritative record of which leaves exist.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::{Leaf, LeafIndex};

/// Trait for page store operations.
///
/// Implementations must be safe to call from turn tasks and from the update loop
/// at the same time.
pub trait PageStore: Send + Sync {
    /// Inserts a leaf only if the index is vacant. Returns whether it was inserted.
    fn try_insert(&self, index: LeafIndex, leaf: Arc<Leaf>) -> bool;

    fn get(&self, index: LeafIndex) -> Option<Arc<Leaf>>;

    /// Removes and returns the leaf at `index`, if any.
    fn remove(&self, index: LeafIndex) -> Option<Arc<Leaf>>;

    /// Point-in-time copy, for iterating without holding the store.
    fn snapshot(&self) -> BTreeMap<LeafIndex, Arc<Leaf>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted indices of the live leaves.
    fn indices(&self) -> Vec<LeafIndex> {
        self.snapshot().into_keys().collect()
    }
}

/// In-memory page store.
pub struct MemoryPageStore {
    leaves: DashMap<LeafIndex, Arc<Leaf>>,
}

impl MemoryPageStore {
    pub fn new() -> Self {
        Self {
            leaves: DashMap::new(),
        }
    }
}

impl Default for MemoryPageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PageStore for MemoryPageStore {
    fn try_insert(&self, index: LeafIndex, leaf: Arc<Leaf>) -> bool {
        match self.leaves.entry(index) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(leaf);
                true
            }
        }
    }

    fn get(&self, index: LeafIndex) -> Option<Arc<Leaf>> {
        self.leaves.get(&index).map(|leaf| leaf.value().clone())
    }

    fn remove(&self, index: LeafIndex) -> Option<Arc<Leaf>> {
        self.leaves.remove(&index).map(|(_, leaf)| leaf)
    }

    fn snapshot(&self) -> BTreeMap<LeafIndex, Arc<Leaf>> {
        self.leaves
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    fn len(&self) -> usize {
        self.leaves.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Material, Surface};

    fn leaf() -> Arc<Leaf> {
        Arc::new(Leaf::new(
            Surface::front(Material::Blank, 1.0, 1.0),
            Surface::back(Material::Blank, 1.0, 1.0),
        ))
    }

    #[test]
    fn test_try_insert_is_idempotent() {
        let store = MemoryPageStore::new();
        let first = leaf();
        let first_id = first.id();

        assert!(store.try_insert(3, first));
        assert!(!store.try_insert(3, leaf()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(3).unwrap().id(), first_id);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let store = MemoryPageStore::new();
        assert!(store.remove(0).is_none());

        store.try_insert(0, leaf());
        assert!(store.remove(0).is_some());
        assert!(store.remove(0).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshot_is_detached_copy() {
        let store = MemoryPageStore::new();
        store.try_insert(2, leaf());
        store.try_insert(0, leaf());

        let snapshot = store.snapshot();
        store.remove(2);

        assert_eq!(snapshot.keys().copied().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(store.indices(), vec![0]);
    }

    #[test]
    fn test_concurrent_inserts_keep_one_winner() {
        let store = Arc::new(MemoryPageStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.try_insert(5, leaf()))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|inserted| *inserted)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(store.len(), 1);
    }
}
