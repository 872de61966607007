//! Cache Module
//!
//! Provides in-memory caching with per-entry expiration on top of a store
//! with soft cost/count limits and LRU eviction.

mod entry;
mod expiring;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, Expiration};
pub use expiring::ExpiringCache;
pub use stats::CacheStats;

pub(crate) use lru::LruTracker;
pub(crate) use store::BoundedStore;
