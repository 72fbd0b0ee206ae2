//! In-memory response cache with a fixed TTL
//!
//! Provides a `ResponseCache` that keeps decoded JSON responses keyed by
//! request, together with the instant they were stored. An entry is served
//! only while `now - stored_at <= ttl`; a read that finds an older entry
//! removes it and reports a miss.

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, trace};

use super::clock::{Clock, SystemClock};

/// Default lifetime of a cache entry in milliseconds
pub const DEFAULT_TTL_MS: i64 = 60_000;

/// A cached response and the instant it was stored
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The cached response body
    value: Value,
    /// When the entry was written
    stored_at: DateTime<Utc>,
}

/// Short-lived cache for API responses
///
/// The cache never fails: a lookup either yields the stored value or `None`.
/// A stored JSON `null` or `false` is returned as `Some(..)`, so callers can
/// tell a cached falsy value from a miss.
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(Duration::milliseconds(DEFAULT_TTL_MS))
    }
}

impl ResponseCache {
    /// Creates a cache with the given TTL, reading time from the system clock
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Creates a cache with the given TTL and time source
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Returns the configured TTL
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // A poisoned map is still a valid map; keep serving it.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Looks up `key`
    ///
    /// Returns the cached value if it was stored no more than `ttl` ago.
    /// Otherwise returns `None`, removing the stale entry if there was one.
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = self.clock.now();
        let mut entries = self.entries();

        let entry = entries.get(key)?;
        if now - entry.stored_at > self.ttl {
            trace!(key, "cache entry expired");
            entries.remove(key);
            return None;
        }

        Some(entry.value.clone())
    }

    /// Looks up `key` and decodes it into `T`
    ///
    /// An entry that no longer decodes into `T` is dropped and treated as a miss.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                debug!(key, error = %e, "dropping undecodable cache entry");
                self.delete(key);
                None
            }
        }
    }

    /// Stores `value` under `key`, replacing any previous entry
    pub fn set(&self, key: impl Into<String>, value: Value) {
        let entry = CacheEntry {
            value,
            stored_at: self.clock.now(),
        };
        self.entries().insert(key.into(), entry);
    }

    /// Removes the entry for `key`, if any
    pub fn delete(&self, key: &str) {
        self.entries().remove(key);
    }

    /// Removes every entry whose key starts with `prefix`
    ///
    /// Returns the number of entries removed.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(prefix, removed, "invalidated cache entries");
        }
        removed
    }

    /// Removes all entries
    pub fn clear(&self) {
        self.entries().clear();
    }

    /// Number of entries currently held, including ones not yet found stale
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Whether an entry exists for `key`, without checking its age
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries().contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use chrono::TimeZone;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn create_test_cache() -> (ResponseCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc.timestamp_millis_opt(0).unwrap()));
        let cache = ResponseCache::with_clock(
            Duration::milliseconds(DEFAULT_TTL_MS),
            clock.clone(),
        );
        (cache, clock)
    }

    #[test]
    fn test_get_returns_none_for_missing_key() {
        let (cache, _clock) = create_test_cache();

        assert!(cache.get("nonexistent_key").is_none());
    }

    #[test]
    fn test_get_returns_value_just_before_ttl() {
        let (cache, clock) = create_test_cache();
        cache.set("task-42", json!({"title": "Fix sink"}));

        clock.advance(Duration::milliseconds(59_999));

        assert_eq!(cache.get("task-42"), Some(json!({"title": "Fix sink"})));
    }

    #[test]
    fn test_get_returns_value_exactly_at_ttl() {
        let (cache, clock) = create_test_cache();
        cache.set("task-42", json!({"title": "Fix sink"}));

        clock.advance(Duration::milliseconds(DEFAULT_TTL_MS));

        assert!(cache.get("task-42").is_some());
    }

    #[test]
    fn test_get_after_ttl_misses_and_removes_entry() {
        let (cache, clock) = create_test_cache();
        cache.set("task-42", json!({"title": "Fix sink"}));

        clock.advance(Duration::milliseconds(60_001));

        assert!(cache.get("task-42").is_none());
        assert!(!cache.contains_key("task-42"), "Stale entry should be removed");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_falsy_values_are_distinguishable_from_miss() {
        let (cache, _clock) = create_test_cache();
        cache.set("null", Value::Null);
        cache.set("false", json!(false));
        cache.set("empty", json!([]));

        assert_eq!(cache.get("null"), Some(Value::Null));
        assert_eq!(cache.get("false"), Some(json!(false)));
        assert_eq!(cache.get("empty"), Some(json!([])));
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn test_overwrite_resets_stored_at() {
        let (cache, clock) = create_test_cache();
        cache.set("key", json!(1));

        clock.advance(Duration::milliseconds(50_000));
        cache.set("key", json!(2));
        clock.advance(Duration::milliseconds(50_000));

        assert_eq!(cache.get("key"), Some(json!(2)), "Overwrite should refresh the TTL");
    }

    #[test]
    fn test_delete_removes_only_that_key() {
        let (cache, _clock) = create_test_cache();
        cache.set("current-user", json!({"id": 1}));
        cache.set("task-1", json!({"id": 1}));

        cache.delete("current-user");
        cache.delete("never-stored");

        assert!(cache.get("current-user").is_none());
        assert!(cache.get("task-1").is_some());
    }

    #[test]
    fn test_clear_removes_everything() {
        let (cache, _clock) = create_test_cache();
        let keys = ["tasks-{}", "task-1", "current-user", "markers-"];
        for key in keys {
            cache.set(key, json!({"k": key}));
        }

        cache.clear();

        for key in keys {
            assert!(cache.get(key).is_none(), "{} should be gone after clear", key);
        }
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_invalidate_prefix() {
        let (cache, _clock) = create_test_cache();
        cache.set(r#"tasks-{"limit":10,"page":1}"#, json!([]));
        cache.set(r#"tasks-{"limit":10,"page":2}"#, json!([]));
        cache.set("task-7", json!({}));

        let removed = cache.invalidate_prefix("tasks-");

        assert_eq!(removed, 2);
        assert!(cache.get("task-7").is_some(), "task- must not match tasks-");
    }

    #[test]
    fn test_get_as_decodes_typed_value() {
        let (cache, _clock) = create_test_cache();
        let data = TestData {
            name: "typed".to_string(),
            value: 7,
        };
        cache.set("typed", serde_json::to_value(&data).unwrap());

        let result: Option<TestData> = cache.get_as("typed");

        assert_eq!(result, Some(data));
    }

    #[test]
    fn test_get_as_drops_entry_of_wrong_shape() {
        let (cache, _clock) = create_test_cache();
        cache.set("typed", json!("not an object"));

        let result: Option<TestData> = cache.get_as("typed");

        assert!(result.is_none());
        assert!(!cache.contains_key("typed"));
    }

    #[test]
    fn test_custom_ttl() {
        let clock = Arc::new(ManualClock::new(Utc.timestamp_millis_opt(0).unwrap()));
        let cache = ResponseCache::with_clock(Duration::seconds(5), clock.clone());
        cache.set("short", json!(1));

        clock.advance(Duration::seconds(6));

        assert_eq!(cache.ttl(), Duration::seconds(5));
        assert!(cache.get("short").is_none());
    }

    #[test]
    fn test_default_uses_one_minute_ttl() {
        let cache = ResponseCache::default();
        assert_eq!(cache.ttl(), Duration::milliseconds(60_000));
    }
}
