//! Short-lived memoisation of upstream read operations.
//!
//! One entry per logical operation key (`all_stocks`, `market_summary`, ...).
//! Entries are overwritten, never merged, and an entry older than the TTL is
//! treated as absent. There is no size bound and no background eviction: the
//! key space is the fixed set of cacheable operations.

use std::time::{Duration, Instant};

use ahash::AHashMap;
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

struct CacheEntry {
    payload: Value,
    stored_at: Instant,
}

pub struct ResponseCache {
    entries: Mutex<AHashMap<&'static str, CacheEntry>>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self { entries: Mutex::new(AHashMap::new()), ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get<T: DeserializeOwned>(&self, key: &'static str) -> Option<T> {
        self.get_at(key, Instant::now())
    }

    pub fn set<T: Serialize>(&self, key: &'static str, payload: &T) {
        self.set_at(key, payload, Instant::now());
    }

    /// Read as of `now`. A payload that no longer matches `T` counts as a miss.
    pub fn get_at<T: DeserializeOwned>(&self, key: &'static str, now: Instant) -> Option<T> {
        let entries = self.entries.lock();
        let entry = entries.get(key)?;
        if now.saturating_duration_since(entry.stored_at) >= self.ttl {
            debug!(key, "cache entry expired");
            return None;
        }
        match serde_json::from_value(entry.payload.clone()) {
            Ok(v) => {
                debug!(key, "cache hit");
                Some(v)
            }
            Err(e) => {
                warn!(key, error = %e, "cached payload has unexpected shape");
                None
            }
        }
    }

    pub fn set_at<T: Serialize>(&self, key: &'static str, payload: &T, now: Instant) {
        match serde_json::to_value(payload) {
            Ok(payload) => {
                self.entries.lock().insert(key, CacheEntry { payload, stored_at: now });
            }
            Err(e) => warn!(key, error = %e, "payload not cacheable"),
        }
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
