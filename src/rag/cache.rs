//! Summary cache for the PDF summarizer
//!
//! Summaries are keyed by the SHA-256 of the uploaded PDF bytes, so the same
//! paper uploaded twice (or fetched twice from a URL) costs one model call.

use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics for cache performance monitoring
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entry_count: usize,
}

impl CacheStats {
    /// Calculate hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

pub struct SummaryCache {
    entries: Option<Mutex<LruCache<String, String>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SummaryCache {
    /// A capacity of zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Hex SHA-256 of the document bytes
    pub fn compute_key(bytes: &[u8]) -> String {
        hex::encode(Sha256::digest(bytes))
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.as_ref()?;
        let found = entries.lock().get(key).cloned();
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    pub fn insert(&self, key: String, summary: String) {
        if let Some(entries) = &self.entries {
            entries.lock().put(key, summary);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: self.entries.as_ref().map(|e| e.lock().len()).unwrap_or(0),
        }
    }
}
