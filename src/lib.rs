//! Expiring Cache - An in-memory object cache
//!
//! Stores values with optional per-entry expiration and soft cost/count
//! limits, notifying a listener when entries are evicted under capacity
//! pressure.

pub mod cache;
pub mod config;
pub mod error;
pub mod shared;

pub use cache::{CacheStats, Expiration, ExpiringCache};
pub use config::CacheConfig;
pub use error::ConfigError;
pub use shared::SharedCache;
