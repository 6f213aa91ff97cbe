//! Staged state — write buffering with commit / rollback
//!
//! Every piece of contract state lives in a staged container. Writes made
//! while an operation runs land in a pending layer that reads see first;
//! the runtime then either commits the pending layer into the committed
//! layer or discards it. Outside an operation the pending layer is empty.

use std::collections::HashMap;
use std::hash::Hash;

/// State that participates in the runtime's all-or-nothing execution.
pub trait Transactional {
    /// Fold staged writes into committed state.
    fn commit(&mut self);

    /// Discard staged writes.
    fn rollback(&mut self);

    /// Whether any write is currently staged.
    fn has_pending(&self) -> bool;
}

/// Key-value map with a staged write layer.
///
/// Entries are never removed: registry bindings, wallets and balances only
/// ever get inserted or overwritten.
#[derive(Debug, Clone)]
pub struct StagedMap<K, V> {
    committed: HashMap<K, V>,
    staged: HashMap<K, V>,
}

impl<K: Eq + Hash, V> StagedMap<K, V> {
    pub fn new() -> Self {
        Self {
            committed: HashMap::new(),
            staged: HashMap::new(),
        }
    }

    /// Read through the staged layer, falling back to committed state.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.staged.get(key).or_else(|| self.committed.get(key))
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.staged.contains_key(key) || self.committed.contains_key(key)
    }

    /// Stage a write.
    pub fn insert(&mut self, key: K, value: V) {
        self.staged.insert(key, value);
    }

    /// Number of distinct keys across both layers.
    pub fn len(&self) -> usize {
        self.committed.len()
            + self
                .staged
                .keys()
                .filter(|k| !self.committed.contains_key(*k))
                .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate committed entries only.
    pub fn iter_committed(&self) -> impl Iterator<Item = (&K, &V)> {
        self.committed.iter()
    }
}

impl<K: Eq + Hash, V> Default for StagedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V> Transactional for StagedMap<K, V> {
    fn commit(&mut self) {
        self.committed.extend(self.staged.drain());
    }

    fn rollback(&mut self) {
        self.staged.clear();
    }

    fn has_pending(&self) -> bool {
        !self.staged.is_empty()
    }
}

/// Append-only log with a staged tail.
///
/// Committed entries are numbered from zero without gaps; numbers handed
/// to staged entries are reused after a rollback.
#[derive(Debug, Clone)]
pub struct StagedLog<T> {
    committed: Vec<T>,
    staged: Vec<T>,
    /// Sequence number of the first entry in `committed`
    base_sequence: u64,
}

impl<T> StagedLog<T> {
    pub fn new() -> Self {
        Self {
            committed: Vec::new(),
            staged: Vec::new(),
            base_sequence: 0,
        }
    }

    /// Sequence number the next appended entry will receive.
    pub fn next_sequence(&self) -> u64 {
        self.base_sequence + (self.committed.len() + self.staged.len()) as u64
    }

    /// Stage an entry and return its sequence number.
    pub fn append(&mut self, entry: T) -> u64 {
        let sequence = self.next_sequence();
        self.staged.push(entry);
        sequence
    }

    /// Committed entries in sequence order.
    pub fn committed(&self) -> &[T] {
        &self.committed
    }

    /// Take every committed entry, keeping the sequence counter running.
    pub fn drain_committed(&mut self) -> Vec<T> {
        self.base_sequence += self.committed.len() as u64;
        std::mem::take(&mut self.committed)
    }
}

impl<T> Default for StagedLog<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Transactional for StagedLog<T> {
    fn commit(&mut self) {
        self.committed.append(&mut self.staged);
    }

    fn rollback(&mut self) {
        self.staged.clear();
    }

    fn has_pending(&self) -> bool {
        !self.staged.is_empty()
    }
}
