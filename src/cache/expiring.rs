//! Expiring Cache Module
//!
//! Public cache combining per-entry TTL with the bounded store's soft
//! cost/count limits.

use std::fmt;
use std::hash::Hash;

use tracing::debug;

use crate::cache::{BoundedStore, CacheEntry, CacheStats, Expiration};
use crate::config::CacheConfig;

// == Expiring Cache ==
/// An in-memory cache with optional per-entry expiration and soft limits.
///
/// Expiration is checked, never scheduled: an expired entry stays resident
/// (and keeps counting against the limits) until it is read, removed, or
/// evicted under capacity pressure. Reading an expired entry drops it
/// silently. Only capacity evictions reach the eviction listener.
///
/// # Example
/// ```
/// use expiring_cache::{Expiration, ExpiringCache};
///
/// let mut cache = ExpiringCache::new().with_count_limit(100);
/// cache.set_with("token", "abc", 0, Expiration::Seconds(30));
/// assert_eq!(cache.get(&"token"), Some(&"abc"));
/// ```
pub struct ExpiringCache<K, V> {
    /// Entry storage with capacity eviction
    store: BoundedStore<K, CacheEntry<V>>,
    /// Read-side counters; evictions come from the store
    stats: CacheStats,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructors ==
    /// Creates an unnamed cache without cost or count limits.
    pub fn new() -> Self {
        Self {
            store: BoundedStore::new(),
            stats: CacheStats::new(),
        }
    }

    /// Creates a cache configured from `config`.
    pub fn from_config(config: &CacheConfig) -> Self {
        let mut cache = Self::new()
            .with_name(config.name.clone())
            .with_cost_limit(config.cost_limit)
            .with_count_limit(config.count_limit);
        cache.set_evicts_objects_with_discarded_content(
            config.evicts_objects_with_discarded_content,
        );
        cache
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.set_name(name);
        self
    }

    pub fn with_cost_limit(mut self, limit: usize) -> Self {
        self.set_cost_limit(limit);
        self
    }

    pub fn with_count_limit(mut self, limit: usize) -> Self {
        self.set_count_limit(limit);
        self
    }

    // == Get ==
    /// Returns the value for `key`, or None if it is absent or expired.
    ///
    /// An expired entry is removed from the store before returning None.
    /// That removal does not invoke the eviction listener.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let expired = match self.store.peek(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.store.remove(key);
            self.stats.record_expiration();
            debug!(cache = %self.store.name(), "dropped expired entry on read");
            return None;
        }

        self.stats.record_hit();
        self.store.get(key).map(|entry| &entry.value)
    }

    // == Set ==
    /// Stores `value` for `key` with zero cost and no expiration.
    pub fn set(&mut self, key: K, value: V) {
        self.set_with(key, value, 0, Expiration::Never);
    }

    /// Stores `value` for `key` with the given cost and expiration policy.
    ///
    /// An existing entry for `key` is replaced without notifying the
    /// eviction listener. If the insert pushes the cache over a limit,
    /// other entries may be evicted and reported to the listener.
    pub fn set_with(&mut self, key: K, value: V, cost: usize, expiration: Expiration) {
        self.store.insert(key, CacheEntry::new(value, expiration), cost);
    }

    // == Remove ==
    /// Removes the entry for `key`, returning its value if one was stored.
    ///
    /// The value is returned even if the entry had already expired.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.store.remove(key).map(CacheEntry::into_value)
    }

    /// Empties the cache without notifying the eviction listener.
    pub fn remove_all(&mut self) {
        self.store.clear();
    }

    // == Eviction Listener ==
    /// Registers a callback receiving each value evicted under capacity
    /// pressure, replacing any previous callback.
    pub fn set_eviction_listener<F>(&mut self, mut listener: F)
    where
        F: FnMut(V) + Send + Sync + 'static,
        V: 'static,
    {
        self.store
            .set_listener(Box::new(move |entry: CacheEntry<V>| listener(entry.value)));
    }

    pub fn clear_eviction_listener(&mut self) {
        self.store.clear_listener();
    }

    pub fn has_eviction_listener(&self) -> bool {
        self.store.has_listener()
    }

    // == Configuration ==
    pub fn name(&self) -> &str {
        self.store.name()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.store.set_name(name);
    }

    /// Aggregate cost ceiling, 0 = unlimited.
    pub fn cost_limit(&self) -> usize {
        self.store.cost_limit()
    }

    pub fn set_cost_limit(&mut self, limit: usize) {
        self.store.set_cost_limit(limit);
    }

    /// Entry count ceiling, 0 = unlimited.
    pub fn count_limit(&self) -> usize {
        self.store.count_limit()
    }

    pub fn set_count_limit(&mut self, limit: usize) {
        self.store.set_count_limit(limit);
    }

    pub fn evicts_objects_with_discarded_content(&self) -> bool {
        self.store.evicts_objects_with_discarded_content()
    }

    pub fn set_evicts_objects_with_discarded_content(&mut self, evicts: bool) {
        self.store.set_evicts_objects_with_discarded_content(evicts);
    }

    // == Introspection ==
    /// Number of resident entries, expired-but-unread ones included.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Checks residency without expiring the entry or touching recency.
    pub fn contains_key(&self, key: &K) -> bool {
        self.store.contains_key(key)
    }

    pub fn total_cost(&self) -> usize {
        self.store.total_cost()
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.evictions = self.store.evictions();
        stats.total_entries = self.store.len();
        stats.total_cost = self.store.total_cost();
        stats
    }
}

impl<K, V> Default for ExpiringCache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for ExpiringCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiringCache")
            .field("store", &self.store)
            .field("stats", &self.stats)
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_set_and_get() {
        let mut cache = ExpiringCache::new();

        cache.set("key1", "TestObject");

        assert_eq!(cache.get(&"key1"), Some(&"TestObject"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_missing_key() {
        let mut cache: ExpiringCache<&str, &str> = ExpiringCache::new();
        assert_eq!(cache.get(&"missing"), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_expired_read_removes_entry() {
        let mut cache = ExpiringCache::new();
        cache.set_with("key1", "value", 3, Expiration::Milliseconds(20));
        assert_eq!(cache.get(&"key1"), Some(&"value"));

        sleep(Duration::from_millis(60));

        // expired entries linger until read
        assert!(cache.contains_key(&"key1"));
        assert_eq!(cache.total_cost(), 3);

        assert_eq!(cache.get(&"key1"), None);
        assert!(!cache.contains_key(&"key1"));
        assert_eq!(cache.total_cost(), 0);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.expirations, 1);
    }

    #[test]
    fn test_expired_read_does_not_notify() {
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&evicted);
        let mut cache = ExpiringCache::new().with_count_limit(5);
        cache.set_eviction_listener(move |v| sink.lock().unwrap().push(v));

        cache.set_with("key1", "value", 0, Expiration::Milliseconds(10));
        sleep(Duration::from_millis(40));

        assert_eq!(cache.get(&"key1"), None);
        assert!(evicted.lock().unwrap().is_empty());
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_overwrite_resets_expiration() {
        let mut cache = ExpiringCache::new();
        cache.set_with("key1", "A", 0, Expiration::Milliseconds(10));
        cache.set("key1", "B");

        sleep(Duration::from_millis(40));

        assert_eq!(cache.get(&"key1"), Some(&"B"));
    }

    #[test]
    fn test_remove_returns_value() {
        let mut cache = ExpiringCache::new();
        cache.set(1u32, String::from("one"));

        assert_eq!(cache.remove(&1), Some(String::from("one")));
        assert_eq!(cache.remove(&1), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_limits_through_builder() {
        let cache: ExpiringCache<u8, u8> = ExpiringCache::new()
            .with_name("thumbnails")
            .with_cost_limit(64)
            .with_count_limit(8);

        assert_eq!(cache.name(), "thumbnails");
        assert_eq!(cache.cost_limit(), 64);
        assert_eq!(cache.count_limit(), 8);
        assert!(!cache.has_eviction_listener());
    }

    #[test]
    fn test_from_config() {
        let config = CacheConfig {
            name: "avatars".to_string(),
            cost_limit: 10,
            count_limit: 2,
            evicts_objects_with_discarded_content: false,
        };
        let cache: ExpiringCache<String, Vec<u8>> = ExpiringCache::from_config(&config);

        assert_eq!(cache.name(), "avatars");
        assert_eq!(cache.cost_limit(), 10);
        assert_eq!(cache.count_limit(), 2);
        assert!(!cache.evicts_objects_with_discarded_content());
    }

    #[test]
    fn test_huge_costs_do_not_overflow() {
        let mut cache = ExpiringCache::new();

        cache.set_with(1u32, "a", usize::MAX, Expiration::Never);
        cache.set_with(2u32, "b", 1, Expiration::Never);

        assert_eq!(cache.total_cost(), usize::MAX);
        assert_eq!(cache.stats().total_cost, usize::MAX);
        assert_eq!(cache.get(&1), Some(&"a"));
        assert_eq!(cache.get(&2), Some(&"b"));
    }

    #[test]
    fn test_listener_with_borrowed_keys() {
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&evicted);
        let owner = vec![String::from("first"), String::from("second")];
        let mut cache: ExpiringCache<&str, u32> = ExpiringCache::new().with_count_limit(1);
        cache.set_eviction_listener(move |v| sink.lock().unwrap().push(v));

        cache.set(owner[0].as_str(), 1);
        cache.set(owner[1].as_str(), 2);

        assert_eq!(*evicted.lock().unwrap(), vec![1]);
        assert_eq!(cache.get(&owner[1].as_str()), Some(&2));
    }

    #[test]
    fn test_listener_receives_original_value() {
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&evicted);
        let mut cache = ExpiringCache::new().with_count_limit(1);
        cache.set_eviction_listener(move |v: Vec<u8>| sink.lock().unwrap().push(v));
        assert!(cache.has_eviction_listener());

        cache.set("key1", vec![1, 2, 3]);
        cache.set("key2", vec![4, 5, 6]);

        assert_eq!(*evicted.lock().unwrap(), vec![vec![1, 2, 3]]);
        assert_eq!(cache.stats().evictions, 1);

        cache.clear_eviction_listener();
        assert!(!cache.has_eviction_listener());
    }
}
