//! Time-boxed result cache.
//!
//! Holds a single computed value and hands it back until its time-to-live
//! expires; the next access after expiry recomputes synchronously. Callers
//! pass `now` explicitly so expiry is deterministic under test.

use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct TtlCache<T> {
    ttl: Duration,
    slot: Option<(Instant, T)>,
}

impl<T> TtlCache<T> {
    /// A zero TTL never serves a cached value.
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, slot: None }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// True when a value exists and was stored less than `ttl` before `now`.
    pub fn is_fresh(&self, now: Instant) -> bool {
        self.age(now).is_some_and(|age| age < self.ttl)
    }

    /// Time since the value was stored.
    pub fn age(&self, now: Instant) -> Option<Duration> {
        self.slot
            .as_ref()
            .map(|(stored_at, _)| now.saturating_duration_since(*stored_at))
    }

    /// The cached value if still fresh.
    pub fn get(&self, now: Instant) -> Option<&T> {
        if self.is_fresh(now) {
            self.slot.as_ref().map(|(_, v)| v)
        } else {
            None
        }
    }

    /// Return the cached value, recomputing it first if stale or absent.
    pub fn get_or_refresh(&mut self, now: Instant, refresh: impl FnOnce() -> T) -> &T {
        if !self.is_fresh(now) {
            debug!(ttl_secs = self.ttl.as_secs(), "cache expired; recomputing");
            self.slot = None;
        }
        let (_, value) = self.slot.get_or_insert_with(|| (now, refresh()));
        value
    }

    /// Drop the cached value so the next access recomputes.
    pub fn invalidate(&mut self) {
        self.slot = None;
    }
}
