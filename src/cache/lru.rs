//! LRU Tracker Module
//!
//! Recency ordering used by the bounded store to pick eviction victims.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

// == LRU Tracker ==
/// Tracks access order of store keys.
///
/// Every touch stamps the key with a fresh monotonic tick. `order` maps
/// ticks to keys, so the first entry is the least recently used; `ticks`
/// maps each key back to its current tick. Touch, remove and eviction are
/// all O(log n).
#[derive(Debug)]
pub(crate) struct LruTracker<K> {
    /// Keys ordered by last access tick
    order: BTreeMap<u64, K>,
    /// Current tick of every tracked key
    ticks: HashMap<K, u64>,
    /// Next tick to hand out
    next_tick: u64,
}

impl<K> Default for LruTracker<K> {
    fn default() -> Self {
        Self {
            order: BTreeMap::new(),
            ticks: HashMap::new(),
            next_tick: 0,
        }
    }
}

impl<K: Hash + Eq + Clone> LruTracker<K> {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used.
    pub fn touch(&mut self, key: &K) {
        let tick = self.next_tick;
        self.next_tick += 1;

        match self.ticks.get_mut(key) {
            Some(current) => {
                let previous = std::mem::replace(current, tick);
                if let Some(k) = self.order.remove(&previous) {
                    self.order.insert(tick, k);
                }
            }
            None => {
                self.ticks.insert(key.clone(), tick);
                self.order.insert(tick, key.clone());
            }
        }
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &K) {
        if let Some(tick) = self.ticks.remove(key) {
            self.order.remove(&tick);
        }
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<K> {
        let (_, key) = self.order.pop_first()?;
        self.ticks.remove(&key);
        Some(key)
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.ticks.clear();
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    #[cfg(test)]
    pub fn peek_oldest(&self) -> Option<&K> {
        self.order.values().next()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, key: &K) -> bool {
        self.ticks.contains_key(key)
    }
}
