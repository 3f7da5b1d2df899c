// ============================================================================
// spark-props - Weak-Keyed Map
// Identity-keyed association that never keeps its keys alive
// ============================================================================
//
// Keys are `Rc` allocations identified by address. Each entry stores a
// `Weak` to its key: while that `Weak` exists the allocation is not freed,
// so the address cannot be handed to a different value. Once the key's
// strong count reaches zero the entry is dead and is pruned on the next
// insertion or removal (or an explicit `prune`).
// ============================================================================

use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Address of an `Rc` allocation, used as the map key.
fn address<K: ?Sized>(key: &Rc<K>) -> usize {
    Rc::as_ptr(key) as *const () as usize
}

/// A map from `Rc<K>` identity to `V` that holds only weak references to keys.
pub struct WeakKeyMap<K: ?Sized, V> {
    entries: HashMap<usize, (Weak<K>, V)>,
}

impl<K: ?Sized, V> WeakKeyMap<K, V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Look up the value associated with `key`.
    pub fn get(&self, key: &Rc<K>) -> Option<&V> {
        self.entries
            .get(&address(key))
            .filter(|(weak, _)| weak.strong_count() > 0)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, key: &Rc<K>) -> Option<&mut V> {
        self.entries
            .get_mut(&address(key))
            .filter(|(weak, _)| weak.strong_count() > 0)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &Rc<K>) -> bool {
        self.get(key).is_some()
    }

    /// Associate `value` with `key`, returning the previous value.
    pub fn insert(&mut self, key: &Rc<K>, value: V) -> Option<V> {
        self.prune();
        self.entries
            .insert(address(key), (Rc::downgrade(key), value))
            .map(|(_, previous)| previous)
    }

    /// Get the value for `key`, inserting `make()` first if absent.
    pub fn get_or_insert_with(&mut self, key: &Rc<K>, make: impl FnOnce() -> V) -> &mut V {
        if !self.contains_key(key) {
            self.insert(key, make());
        }
        match self.entries.get_mut(&address(key)) {
            Some((_, value)) => value,
            None => unreachable!("entry inserted above"),
        }
    }

    pub fn remove(&mut self, key: &Rc<K>) -> Option<V> {
        self.prune();
        self.entries.remove(&address(key)).map(|(_, value)| value)
    }

    /// Take out entries whose key no longer has strong references.
    ///
    /// The dead values are returned so the caller decides where they drop.
    pub fn prune(&mut self) -> Vec<V> {
        let dead: Vec<usize> = self
            .entries
            .iter()
            .filter(|(_, (weak, _))| weak.strong_count() == 0)
            .map(|(address, _)| *address)
            .collect();
        dead.into_iter()
            .filter_map(|address| self.entries.remove(&address))
            .map(|(_, value)| value)
            .collect()
    }

    /// Number of entries with live keys.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|(weak, _)| weak.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: ?Sized, V> Default for WeakKeyMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================
