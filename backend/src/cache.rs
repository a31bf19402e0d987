//! In-memory response cache with per-entry time-to-live.
//!
//! Entries are evicted only by expiry; there is no capacity bound. Values are
//! the serialized JSON responses, so a hit replays exactly what the first
//! request returned.

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde_json::Value;

use crate::clock::{Clock, SystemClock};

/// Default lifetime of cached exoplanet listings.
pub const EXOPLANET_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Default lifetime of cached NEO feed pages.
pub const NEO_TTL: Duration = Duration::from_secs(60 * 60);
/// Default lifetime of cached Mars weather responses.
pub const INSIGHT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Longest lifetime an entry can get; larger TTLs are clamped to it.
pub const MAX_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Sentinel used in cache keys for unset filters.
pub const UNSET: &str = "all";

/// Key/value cache contract used by the data services.
pub trait ResponseCache: Send + Sync {
    /// Returns the value for `key` if present and not expired.
    fn get(&self, key: &str) -> Option<Value>;

    /// Stores `value` under `key` for `ttl`, replacing any previous entry.
    fn put(&self, key: String, value: Value, ttl: Duration);

    /// Drops expired entries and returns how many were removed.
    fn purge_expired(&self) -> usize;

    /// Number of stored entries, including expired ones not yet purged.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&self);
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// Thread-safe map-backed cache.
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl ResponseCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        let now = self.clock.now();
        self.entries.read().get(key).and_then(|entry| {
            if now < entry.expires_at {
                Some(entry.value.clone())
            } else {
                None
            }
        })
    }

    fn put(&self, key: String, value: Value, ttl: Duration) {
        if ttl.is_zero() {
            return;
        }
        let Some(expires_at) = self.clock.now().checked_add(ttl.min(MAX_TTL)) else {
            log::warn!("Not caching {}: expiry overflows the clock", key);
            return;
        };
        self.entries
            .write()
            .insert(key, CacheEntry { value, expires_at });
    }

    fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }

    fn clear(&self) {
        self.entries.write().clear();
    }
}

/// Builds `prefix_part1_part2...`, rendering `None` parts as [`UNSET`].
pub fn cache_key(prefix: &str, parts: &[Option<String>]) -> String {
    let mut key = String::from(prefix);
    for part in parts {
        key.push('_');
        key.push_str(part.as_deref().unwrap_or(UNSET));
    }
    key
}

/// Renders an optional filter value as a cache key part.
pub fn key_part<T: Display>(value: Option<T>) -> Option<String> {
    value.map(|v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::NaiveDate;
    use serde_json::json;

    fn cache_with_clock() -> (MemoryCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        ));
        (MemoryCache::new(clock.clone()), clock)
    }

    #[test]
    fn test_get_returns_stored_value_before_expiry() {
        let (cache, clock) = cache_with_clock();
        cache.put("k".into(), json!({"a": 1}), Duration::from_secs(60));
        clock.advance(Duration::from_secs(59));
        assert_eq!(cache.get("k"), Some(json!({"a": 1})));
    }

    #[test]
    fn test_entry_expires_at_ttl() {
        let (cache, clock) = cache_with_clock();
        cache.put("k".into(), json!(1), Duration::from_secs(60));
        clock.advance(Duration::from_secs(60));
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_overwrites_and_refreshes_expiry() {
        let (cache, clock) = cache_with_clock();
        cache.put("k".into(), json!(1), Duration::from_secs(10));
        clock.advance(Duration::from_secs(8));
        cache.put("k".into(), json!(2), Duration::from_secs(10));
        clock.advance(Duration::from_secs(8));
        assert_eq!(cache.get("k"), Some(json!(2)));
    }

    #[test]
    fn test_zero_ttl_is_not_stored() {
        let (cache, _) = cache_with_clock();
        cache.put("k".into(), json!(1), Duration::ZERO);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_huge_ttl_is_clamped() {
        let (cache, clock) = cache_with_clock();
        cache.put("k".into(), json!(1), Duration::from_secs(u64::MAX));
        clock.advance(Duration::from_secs(365 * 24 * 60 * 60));
        assert_eq!(cache.get("k"), Some(json!(1)));
        clock.advance(MAX_TTL);
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_cache_key_uses_sentinel_for_unset_parts() {
        let key = cache_key(
            "neos",
            &[key_part(Some(true)), key_part::<&str>(None), key_part(Some(2))],
        );
        assert_eq!(key, "neos_true_all_2");
    }

    #[test]
    fn test_distinct_filters_do_not_collide() {
        let a = cache_key("exoplanets", &[key_part(Some("M")), None, None]);
        let b = cache_key("exoplanets", &[None, key_part(Some("M")), None]);
        assert_ne!(a, b);
    }
}
