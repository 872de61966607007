//! Bounded Store Module
//!
//! Capacity-bounded associative storage with soft cost/count limits and an
//! eviction listener. Victims are picked least recently used first.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use tracing::{debug, info, trace};

use crate::cache::LruTracker;

/// Callback invoked with each value evicted under capacity pressure.
pub(crate) type EvictionListener<T> = Box<dyn FnMut(T) + Send + Sync + 'static>;

// == Slot ==
/// A stored value with its eviction cost.
#[derive(Debug)]
struct Slot<T> {
    value: T,
    cost: usize,
}

// == Bounded Store ==
/// Key-value storage that evicts entries once a soft limit is exceeded.
///
/// A limit of 0 means unlimited. Limits are enforced after every insert and
/// whenever a limit is lowered. The most recently used entry is never
/// evicted, so one oversized entry may keep the store above `cost_limit`.
/// The running cost total is kept exactly and reported saturated at
/// `usize::MAX`.
pub(crate) struct BoundedStore<K, T> {
    /// Key-value storage
    entries: HashMap<K, Slot<T>>,
    /// LRU access tracker
    lru: LruTracker<K>,
    /// Sum of the costs of all resident entries, wide enough not to overflow
    total_cost: u128,
    /// Aggregate cost ceiling, 0 = unlimited
    cost_limit: usize,
    /// Entry count ceiling, 0 = unlimited
    count_limit: usize,
    /// Cosmetic identifier used in log records
    name: String,
    /// Opaque flag kept for callers storing discardable content
    evicts_objects_with_discarded_content: bool,
    /// Receives values evicted under capacity pressure
    listener: Option<EvictionListener<T>>,
    /// Number of capacity evictions so far
    evictions: u64,
}

impl<K, T> BoundedStore<K, T>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates an empty store with no limits.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            total_cost: 0,
            cost_limit: 0,
            count_limit: 0,
            name: String::new(),
            evicts_objects_with_discarded_content: true,
            listener: None,
            evictions: 0,
        }
    }

    // == Insert ==
    /// Inserts or replaces the value for `key` with the given cost.
    ///
    /// A replaced value is returned to the caller and is not reported to
    /// the eviction listener. Limits are enforced afterwards.
    pub fn insert(&mut self, key: K, value: T, cost: usize) -> Option<T> {
        let replaced = self.entries.insert(key.clone(), Slot { value, cost });
        let replaced = replaced.map(|old| {
            self.total_cost -= old.cost as u128;
            old.value
        });
        self.total_cost += cost as u128;
        self.lru.touch(&key);

        trace!(
            cache = %self.name,
            cost,
            replaced = replaced.is_some(),
            "stored entry"
        );

        self.enforce_limits();
        replaced
    }

    // == Get ==
    /// Returns the value for `key` and marks it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&T> {
        let slot = self.entries.get(key)?;
        self.lru.touch(key);
        Some(&slot.value)
    }

    // == Peek ==
    /// Returns the value for `key` without touching recency.
    pub fn peek(&self, key: &K) -> Option<&T> {
        self.entries.get(key).map(|slot| &slot.value)
    }

    // == Remove ==
    /// Removes the value for `key` without notifying the listener.
    pub fn remove(&mut self, key: &K) -> Option<T> {
        let slot = self.entries.remove(key)?;
        self.lru.remove(key);
        self.total_cost -= slot.cost as u128;
        Some(slot.value)
    }

    // == Clear ==
    /// Removes every entry without notifying the listener.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.total_cost = 0;
    }

    // == Limits ==
    pub fn cost_limit(&self) -> usize {
        self.cost_limit
    }

    /// Sets the aggregate cost ceiling and evicts down to it if needed.
    pub fn set_cost_limit(&mut self, limit: usize) {
        info!(cache = %self.name, limit, "cost limit changed");
        self.cost_limit = limit;
        self.enforce_limits();
    }

    pub fn count_limit(&self) -> usize {
        self.count_limit
    }

    /// Sets the entry count ceiling and evicts down to it if needed.
    pub fn set_count_limit(&mut self, limit: usize) {
        info!(cache = %self.name, limit, "count limit changed");
        self.count_limit = limit;
        self.enforce_limits();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn evicts_objects_with_discarded_content(&self) -> bool {
        self.evicts_objects_with_discarded_content
    }

    pub fn set_evicts_objects_with_discarded_content(&mut self, evicts: bool) {
        self.evicts_objects_with_discarded_content = evicts;
    }

    // == Eviction Listener ==
    /// Registers the eviction listener, replacing any previous one.
    pub fn set_listener(&mut self, listener: EvictionListener<T>) {
        self.listener = Some(listener);
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    pub fn has_listener(&self) -> bool {
        self.listener.is_some()
    }

    // == Introspection ==
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Aggregate cost of resident entries, saturating at `usize::MAX`.
    pub fn total_cost(&self) -> usize {
        usize::try_from(self.total_cost).unwrap_or(usize::MAX)
    }

    /// Number of capacity evictions performed so far.
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    fn over_limits(&self) -> bool {
        let over_count = self.count_limit > 0 && self.entries.len() > self.count_limit;
        let over_cost = self.cost_limit > 0 && self.total_cost > self.cost_limit as u128;
        over_count || over_cost
    }

    // == Enforce Limits ==
    /// Evicts least recently used entries until both limits hold or only
    /// the most recently used entry is left.
    fn enforce_limits(&mut self) {
        while self.over_limits() && self.entries.len() > 1 {
            let Some(victim) = self.lru.evict_oldest() else {
                break;
            };
            let Some(slot) = self.entries.remove(&victim) else {
                continue;
            };
            self.total_cost -= slot.cost as u128;
            self.evictions += 1;

            debug!(
                cache = %self.name,
                cost = slot.cost,
                remaining = self.entries.len(),
                "evicted entry under capacity pressure"
            );

            if let Some(listener) = self.listener.as_mut() {
                listener(slot.value);
            }
        }
    }
}

impl<K, T> Default for BoundedStore<K, T>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> fmt::Debug for BoundedStore<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedStore")
            .field("name", &self.name)
            .field("len", &self.entries.len())
            .field("total_cost", &self.total_cost)
            .field("cost_limit", &self.cost_limit)
            .field("count_limit", &self.count_limit)
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}
