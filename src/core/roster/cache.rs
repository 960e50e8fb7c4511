//! LRU memo of recent search results.
//!
//! Searching is cheap and pure, so the memo is an optimization only. Entries
//! are keyed by the snapshot revision as well as the query, so results computed
//! before a partition finished loading are never served afterwards.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use lru::LruCache;
use serde::Serialize;

use super::models::StudentRecord;
use super::resolver::Query;

/// Default number of memoized queries.
pub const DEFAULT_CACHE_CAPACITY: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    query: Query,
    revision: u64,
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

pub struct SearchCache {
    entries: Option<Mutex<LruCache<CacheKey, Arc<[StudentRecord]>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SearchCache {
    /// A capacity of zero disables memoization.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the memoized result or compute and store it.
    pub fn get_or_insert_with<F>(&self, query: &Query, revision: u64, compute: F) -> Arc<[StudentRecord]>
    where
        F: FnOnce() -> Vec<StudentRecord>,
    {
        let Some(entries) = &self.entries else {
            return Arc::from(compute());
        };

        let key = CacheKey {
            query: query.clone(),
            revision,
        };

        {
            let mut guard = entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(hit) = guard.get(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Arc::clone(hit);
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        // Computed outside the lock; a racing identical query just recomputes.
        let results: Arc<[StudentRecord]> = Arc::from(compute());
        let mut guard = entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.put(key, Arc::clone(&results));
        results
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self
            .entries
            .as_ref()
            .map(|e| e.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len())
            .unwrap_or(0);
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries,
        }
    }
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
