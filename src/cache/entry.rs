//! Cache Entry Module
//!
//! Defines the expiration policy and the entry wrapper stored for every value.

use std::time::{Duration, Instant};

// == Expiration ==
/// Expiration policy attached to an entry when it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expiration {
    /// The entry never expires
    #[default]
    Never,
    /// The entry expires after the given number of seconds
    Seconds(u64),
    /// The entry expires after the given number of milliseconds
    Milliseconds(u64),
}

impl Expiration {
    /// Returns the time-to-live as a duration, or None for `Never`.
    pub fn as_duration(&self) -> Option<Duration> {
        match *self {
            Expiration::Never => None,
            Expiration::Seconds(secs) => Some(Duration::from_secs(secs)),
            Expiration::Milliseconds(ms) => Some(Duration::from_millis(ms)),
        }
    }
}

// == Cache Entry ==
/// A stored value together with its insertion time and expiration policy.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Insertion instant (monotonic clock)
    pub inserted_at: Instant,
    /// Expiration policy, fixed for the life of the entry
    pub expiration: Expiration,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Wraps `value` in a new entry stamped with the current instant.
    pub fn new(value: V, expiration: Expiration) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
            expiration,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired only once the elapsed time strictly exceeds its
    /// time-to-live. Entries with `Expiration::Never` are never expired.
    pub fn is_expired(&self) -> bool {
        match self.expiration.as_duration() {
            Some(ttl) => self.inserted_at.elapsed() > ttl,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns the remaining time-to-live, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` once the entry has expired
    /// - `Some(remaining)` if the entry has a TTL that hasn't elapsed
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expiration
            .as_duration()
            .map(|ttl| ttl.saturating_sub(self.inserted_at.elapsed()))
    }

    /// Consumes the entry, returning the stored value.
    pub fn into_value(self) -> V {
        self.value
    }
}
