//! Bounded, time-expiring cache of resolved ProjectContexts.
//!
//! Eviction on overflow drops the entry that expires soonest, not the least
//! recently used one. All operations take a single lock, so the
//! purge-then-evict-then-insert sequence is atomic with respect to other
//! callers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

use crate::config::{CacheConfig, MAX_CACHE_TTL_SECS};
use crate::types::ProjectContext;

#[derive(Debug, Clone)]
struct CacheEntry {
    context: Arc<ProjectContext>,
    expires_at: Instant,
}

/// A TTL cache keyed by project id or namespace.
#[derive(Debug)]
pub struct ContextCache {
    ttl: Duration,
    max_entries: usize,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ContextCache {
    /// Creates a cache. A `max_entries` of zero is raised to one and the TTL
    /// is capped at [`MAX_CACHE_TTL_SECS`].
    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl: ttl.min(Duration::from_secs(MAX_CACHE_TTL_SECS)),
            max_entries: max_entries.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a cache from configuration.
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.ttl(), config.max_entries)
    }

    /// Returns the TTL applied to new entries.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the capacity.
    #[must_use]
    pub const fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Returns the live entry for `key`.
    pub fn get(&self, key: &str) -> Option<Arc<ProjectContext>> {
        self.get_at(key, Instant::now())
    }

    /// Returns the entry for `key` if it is still live at `now`.
    ///
    /// An expired entry is removed.
    pub fn get_at(&self, key: &str, now: Instant) -> Option<Arc<ProjectContext>> {
        let mut entries = self.entries.lock();

        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(Arc::clone(&entry.context)),
            Some(_) => {
                entries.remove(key);
                debug!(key = %key, "evicted expired context");
                None
            }
            None => None,
        }
    }

    /// Stores `context` under `key` with a fresh TTL.
    pub fn insert(&self, key: &str, context: Arc<ProjectContext>) {
        self.insert_at(key, context, Instant::now());
    }

    /// Stores `context` under `key`, expiring at `now + ttl`.
    ///
    /// If `now + ttl` is not representable the entry is not stored.
    /// Replacing an existing key never evicts. Inserting a new key into a full
    /// cache first drops expired entries, then, if still full, the entry with
    /// the earliest expiry.
    pub fn insert_at(&self, key: &str, context: Arc<ProjectContext>, now: Instant) {
        let Some(expires_at) = now.checked_add(self.ttl) else {
            debug!(key = %key, "context expiry out of range, not cached");
            return;
        };
        let mut entries = self.entries.lock();

        if !entries.contains_key(key) && entries.len() >= self.max_entries {
            let before = entries.len();
            entries.retain(|_, entry| entry.expires_at > now);
            if entries.len() < before {
                debug!(evicted = before - entries.len(), "purged expired contexts");
            }

            if entries.len() >= self.max_entries {
                let soonest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.expires_at)
                    .map(|(k, _)| k.clone());
                if let Some(victim) = soonest {
                    entries.remove(&victim);
                    debug!(key = %victim, "evicted context with earliest expiry");
                }
            }
        }

        entries.insert(
            key.to_string(),
            CacheEntry {
                context,
                expires_at,
            },
        );
    }

    /// Returns true if `key` has an entry, live or expired.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    /// Returns the number of stored entries, including expired ones not yet
    /// evicted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for ContextCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}
