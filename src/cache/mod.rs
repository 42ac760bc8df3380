//! Response cache
//!
//! A simple TTL store of response bodies keyed by `"url:" + server + path`.
//! One instance is created per process (or per resolver), shared by every
//! concurrent resolution through an `Arc`, and never reset mid-process.
//!
//! Entries are never updated in place: a fetch after expiry overwrites them.
//! Expired entries are swept on every insert, so keys that are never read
//! again do not pile up.
//! Concurrent misses on the same key may both fetch and both write; the last
//! write wins.

mod policy;

pub use policy::{cache_ttl, CacheControl, DEFAULT_TTL, MAX_TTL};

use crate::fetch::Payload;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// A cached response body with its expiry
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached body
    pub payload: Payload,

    /// When the entry stops being served
    pub expires_at: Instant,
}

impl CacheEntry {
    /// Creates an entry expiring after `ttl`, capped at [`MAX_TTL`]
    pub fn new(payload: Payload, ttl: Duration) -> Self {
        let now = Instant::now();
        // An unrepresentable expiry leaves the entry born expired
        let expires_at = now.checked_add(ttl.min(MAX_TTL)).unwrap_or(now);

        Self {
            payload,
            expires_at,
        }
    }

    /// Checks if the entry has expired
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Shared TTL store for response bodies
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the live payload for `key`, evicting it if it has expired
    pub async fn get(&self, key: &str) -> Option<Payload> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired() => return Some(entry.payload.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(CacheEntry::is_expired) {
            entries.remove(key);
            tracing::trace!("Evicted expired cache entry {}", key);
        }
        None
    }

    /// Stores `payload` under `key` for `ttl`, replacing any previous entry
    ///
    /// Expired entries are dropped first.
    pub async fn insert(&self, key: impl Into<String>, payload: Payload, ttl: Duration) {
        let mut entries = self.entries.write().await;

        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        let swept = before - entries.len();
        if swept > 0 {
            tracing::trace!("Swept {} expired cache entries", swept);
        }

        entries.insert(key.into(), CacheEntry::new(payload, ttl));
    }

    /// Drops every expired entry, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    /// Number of stored entries, expired or not
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
