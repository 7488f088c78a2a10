//! Bounded, TTL-based response cache for idempotent read-style requests.

use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Caching behavior for policy decisions. Immutable once built.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    pub enabled: bool,
    pub ttl: Duration,
    pub max_entries: usize,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(300),
            max_entries: 1000,
        }
    }
}

impl CachePolicy {
    /// Creates a validated policy. `max_entries` must be at least 1.
    pub fn new(enabled: bool, ttl: Duration, max_entries: usize) -> Result<Self> {
        if max_entries == 0 {
            return Err(Error::Validation(
                "cache max_entries must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            enabled,
            ttl,
            max_entries,
        })
    }

    /// Returns a policy under which the cache stores nothing.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Derives an opaque cache key from the semantically relevant request fields.
///
/// The key is the hex-encoded SHA-256 digest of the fields joined with a
/// stable separator, so logically equivalent requests map to the same key
/// without exposing the original query or identity token. Absent fields hash
/// as empty strings, keeping the function total and deterministic.
pub fn cache_key(request_kind: &str, content: &str, client_id: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(request_kind.as_bytes());
    hasher.update([0x1f]);
    hasher.update(content.as_bytes());
    hasher.update([0x1f]);
    hasher.update(client_id.unwrap_or("").as_bytes());
    hex::encode(hasher.finalize())
}

/// Read-only cache counters, for observability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size: usize,
}

struct CacheEntry {
    value: serde_json::Value,
    inserted_at: Instant,
}

/// Map plus insertion-order queue plus counters, guarded together by one lock.
#[derive(Default)]
struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    insertion_order: VecDeque<String>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Bounded key-value store with per-entry TTL.
///
/// Values are held as JSON so the cache stays agnostic of what it stores; a
/// stored value that no longer deserializes as the requested type reads as a
/// miss rather than an error. Capacity overflow evicts the oldest-inserted
/// entry. All operations are internally synchronized and safe to call from
/// any number of concurrent tasks.
pub struct ResponseCache {
    policy: CachePolicy,
    inner: Mutex<CacheInner>,
}

impl ResponseCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            inner: Mutex::new(CacheInner::default()),
        }
    }

    /// Returns the cached value for `key` if present and not expired.
    ///
    /// Expiration is checked at read time; an expired entry is removed and
    /// reported as a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if !self.policy.enabled {
            return None;
        }

        let mut inner = self.inner.lock().expect("cache lock poisoned");

        let expired = match inner.entries.get(key) {
            Some(entry) => entry.inserted_at.elapsed() > self.policy.ttl,
            None => {
                inner.misses += 1;
                return None;
            }
        };

        if expired {
            inner.entries.remove(key);
            inner.insertion_order.retain(|k| k != key);
            inner.evictions += 1;
            inner.misses += 1;
            return None;
        }

        let value = inner.entries.get(key).map(|e| e.value.clone());
        match value.and_then(|v| serde_json::from_value(v).ok()) {
            Some(decoded) => {
                inner.hits += 1;
                Some(decoded)
            }
            None => {
                // Stored under the same key namespace as a different shape
                inner.misses += 1;
                None
            }
        }
    }

    /// Stores `value` under `key`, replacing any prior entry.
    ///
    /// No-op when the cache is disabled. At capacity, the oldest-inserted
    /// entry is evicted to make room for a new key.
    pub fn put<T: Serialize>(&self, key: &str, value: &T) {
        if !self.policy.enabled {
            return;
        }

        let Ok(json) = serde_json::to_value(value) else {
            // Unserializable payloads are silently skipped; the cache never
            // fails the surrounding call
            debug!("cache: value for key {} is not serializable, skipping", key);
            return;
        };

        let mut inner = self.inner.lock().expect("cache lock poisoned");

        if inner.entries.contains_key(key) {
            // Replacement takes a fresh insertion position
            inner.insertion_order.retain(|k| k != key);
        } else if inner.entries.len() >= self.policy.max_entries {
            if let Some(oldest) = inner.insertion_order.pop_front() {
                inner.entries.remove(&oldest);
                inner.evictions += 1;
                debug!("cache: evicted oldest entry {}", oldest);
            }
        }

        inner.insertion_order.push_back(key.to_string());
        inner.entries.insert(
            key.to_string(),
            CacheEntry {
                value: json,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Removes a single entry if present.
    pub fn invalidate(&self, key: &str) {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        if inner.entries.remove(key).is_some() {
            inner.insertion_order.retain(|k| k != key);
        }
    }

    /// Removes all entries. Counters are preserved.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        inner.entries.clear();
        inner.insertion_order.clear();
    }

    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().expect("cache lock poisoned");
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
            size: inner.entries.len(),
        }
    }
}
