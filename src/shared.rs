//! Shared Cache Handle
//!
//! Cloneable handle that lets several tasks use one cache.

use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::cache::{CacheStats, Expiration, ExpiringCache};
use crate::config::CacheConfig;

/// Thread-safe handle to an [`ExpiringCache`].
///
/// Reads take the write lock because reading an expired entry removes it.
/// Clones share the same underlying cache.
pub struct SharedCache<K, V> {
    /// Cache behind an async lock
    cache: Arc<RwLock<ExpiringCache<K, V>>>,
}

impl<K, V> Clone for SharedCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<K, V> SharedCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Wraps an existing cache.
    pub fn new(cache: ExpiringCache<K, V>) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
        }
    }

    /// Creates a shared cache from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(ExpiringCache::from_config(config))
    }

    /// Returns a clone of the live value for `key`.
    pub async fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let mut cache = self.cache.write().await;
        cache.get(key).cloned()
    }

    pub async fn set(&self, key: K, value: V) {
        self.cache.write().await.set(key, value);
    }

    pub async fn set_with(&self, key: K, value: V, cost: usize, expiration: Expiration) {
        self.cache
            .write()
            .await
            .set_with(key, value, cost, expiration);
    }

    pub async fn remove(&self, key: &K) -> Option<V> {
        self.cache.write().await.remove(key)
    }

    pub async fn remove_all(&self) {
        self.cache.write().await.remove_all();
    }

    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }

    pub async fn stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    /// Runs `f` with exclusive access to the cache.
    pub async fn with_cache<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut ExpiringCache<K, V>) -> R,
    {
        let mut cache = self.cache.write().await;
        f(&mut cache)
    }
}
