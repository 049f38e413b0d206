//! Single-slot expiring cache
//!
//! Holds only the most recent value. There is no eviction beyond time-based
//! staleness: a stale value is dropped on the next `get`.

use crate::clock::SharedClock;
use std::sync::Mutex;
use std::time::Duration;

struct Slot<T> {
    value: T,
    expires_at: i64,
}

/// TTL-based cache for the latest result of an expensive call
pub struct ExpiringCache<T> {
    slot: Mutex<Option<Slot<T>>>,
    ttl: Duration,
    clock: SharedClock,
}

impl<T: Clone> ExpiringCache<T> {
    /// Creates an empty cache whose `set` entries live for `ttl`.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use std::time::Duration;
    /// use btc_guess_provider::cache::ExpiringCache;
    /// use btc_guess_provider::clock::SystemClock;
    ///
    /// let cache: ExpiringCache<u32> = ExpiringCache::new(Duration::from_secs(60), Arc::new(SystemClock));
    /// cache.set(7);
    /// assert_eq!(cache.get(), Some(7));
    /// ```
    pub fn new(ttl: Duration, clock: SharedClock) -> Self {
        Self {
            slot: Mutex::new(None),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value if it has not expired yet
    pub fn get(&self) -> Option<T> {
        let now = self.clock.now_ms();
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            Some(entry) if now < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                *slot = None;
                None
            }
            None => None,
        }
    }

    /// Stores `value` with the cache's default TTL, replacing any previous value
    pub fn set(&self, value: T) {
        self.set_with_expiry(value, self.ttl);
    }

    pub fn set_with_expiry(&self, value: T, ttl: Duration) {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at = self.clock.now_ms().saturating_add(ttl_ms);
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Slot { value, expires_at });
    }

    pub fn invalidate(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }
}
