//! Query cache keyed by collection and list signature.
//!
//! Successful list responses are kept per `(collection, signature)`. A
//! successful write marks every entry of its collection stale so the next
//! read goes back to the server. The map is bounded: when full, stale
//! entries go first, then the least recently fetched.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use serde_json::Value;

/// Entries kept before eviction starts.
pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    stale: bool,
    fetched_at: Instant,
}

type CacheKey = (String, String);

#[derive(Debug)]
pub struct QueryCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    capacity: usize,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache holding at most `capacity` entries (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The cached payload, unless it is missing or stale.
    pub fn get_fresh(&self, collection: &str, signature: &str) -> Option<Value> {
        self.lock()
            .get(&(collection.to_string(), signature.to_string()))
            .filter(|entry| !entry.stale)
            .map(|entry| entry.value.clone())
    }

    /// Store a fresh payload, replacing any previous entry.
    pub fn insert(&self, collection: &str, signature: &str, value: Value) {
        let key = (collection.to_string(), signature.to_string());
        let mut entries = self.lock();
        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            let evicted = evict(&mut entries, self.capacity - 1);
            tracing::debug!(evicted, capacity = self.capacity, "Evicted cached queries");
        }
        entries.insert(
            key,
            CacheEntry {
                value,
                stale: false,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Mark every entry of `collection` stale. Returns how many were marked.
    pub fn invalidate(&self, collection: &str) -> usize {
        let mut entries = self.lock();
        let mut marked = 0;
        for ((owner, _), entry) in entries.iter_mut() {
            if owner == collection && !entry.stale {
                entry.stale = true;
                marked += 1;
            }
        }
        if marked > 0 {
            tracing::debug!(collection, marked, "Invalidated cached queries");
        }
        marked
    }

    /// `Some(true)` when an entry exists but is stale, `None` when absent.
    pub fn is_stale(&self, collection: &str, signature: &str) -> Option<bool> {
        self.lock()
            .get(&(collection.to_string(), signature.to_string()))
            .map(|entry| entry.stale)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// Shrink `entries` to at most `keep`: stale entries first, then the
/// oldest fetches. Returns how many were removed.
fn evict(entries: &mut HashMap<CacheKey, CacheEntry>, keep: usize) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| !entry.stale);
    if entries.len() > keep {
        let mut by_age: Vec<(Instant, CacheKey)> = entries
            .iter()
            .map(|(key, entry)| (entry.fetched_at, key.clone()))
            .collect();
        by_age.sort_by(|a, b| a.0.cmp(&b.0));
        let excess = entries.len() - keep;
        for (_, key) in by_age.into_iter().take(excess) {
            entries.remove(&key);
        }
    }
    before - entries.len()
}
