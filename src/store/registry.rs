//! Insertion-ordered keyed storage with tombstoned removal.
//!
//! Values live in a dense slot vector in the order they were first inserted.
//! Removal leaves a tombstone so that the remaining entries keep their
//! relative order; tombstones are compacted away once they outnumber the
//! live entries.

use std::collections::HashMap;
use std::hash::Hash;

const COMPACTION_THRESHOLD: usize = 32;

#[derive(Debug, Clone)]
pub struct Registry<K, V> {
    slots: Vec<Option<(K, V)>>,
    lookup: HashMap<K, usize>,
}

impl<K, V> Default for Registry<K, V> {
    fn default() -> Self {
        Self { slots: Vec::new(), lookup: HashMap::new() }
    }
}

impl<K: Hash + Eq + Clone, V> Registry<K, V> {
    pub fn new() -> Self { Self::default() }

    #[inline(always)]
    pub fn len(&self) -> usize { self.lookup.len() }

    pub fn is_empty(&self) -> bool { self.lookup.is_empty() }

    #[inline(always)]
    pub fn contains(&self, key: &K) -> bool { self.lookup.contains_key(key) }

    pub fn get(&self, key: &K) -> Option<&V> {
        let slot = *self.lookup.get(key)?;
        self.slots[slot].as_ref().map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let slot = *self.lookup.get(key)?;
        self.slots[slot].as_mut().map(|(_, v)| v)
    }

    /// Appends `value` under `key`. Returns the value back if the key is taken.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), V> {
        if self.lookup.contains_key(&key) {
            return Err(value);
        }
        self.lookup.insert(key.clone(), self.slots.len());
        self.slots.push(Some((key, value)));
        Ok(())
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let slot = self.lookup.remove(key)?;
        let (_, value) = self.slots[slot].take()?;
        self.maybe_compact();
        Some(value)
    }

    /// Iterates live entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.slots.iter().filter_map(|s| s.as_ref().map(|(k, v)| (k, v)))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    fn maybe_compact(&mut self) {
        let dead = self.slots.len() - self.lookup.len();
        if self.slots.len() < COMPACTION_THRESHOLD || dead <= self.lookup.len() {
            return;
        }
        self.slots.retain(Option::is_some);
        for (i, slot) in self.slots.iter().enumerate() {
            if let Some((k, _)) = slot {
                self.lookup.insert(k.clone(), i);
            }
        }
    }
}
