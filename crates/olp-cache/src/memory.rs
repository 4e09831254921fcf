//! In-memory LRU store backing the endpoint and catalog config caches.
//!
//! ## Eviction
//!
//! Entries are bounded by a memory budget rather than a count. When an insert
//! would exceed the budget, ~5% of the budget is freed in one batch, least
//! recently used first. Expiry is checked lazily on read.

use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::store::CacheStore;

struct CachedEntry {
    data: Bytes,
    inserted_at: Instant,
    ttl: Option<Duration>,
}

impl CachedEntry {
    fn is_expired(&self) -> bool {
        self.ttl
            .map(|ttl| self.inserted_at.elapsed() > ttl)
            .unwrap_or(false)
    }
}

/// Counters for the memory cache. Atomic so they can be read without the lock.
#[derive(Default)]
pub struct MemoryCacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub evictions: AtomicU64,
    pub expired: AtomicU64,
    pub size_bytes: AtomicU64,
    pub entry_count: AtomicU64,
}

impl MemoryCacheStats {
    /// Hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}

/// Memory-bounded LRU cache with optional per-store TTL.
pub struct MemoryCache {
    cache: Arc<RwLock<LruCache<String, CachedEntry>>>,
    max_bytes: u64,
    ttl: Option<Duration>,
    stats: Arc<MemoryCacheStats>,
}

impl MemoryCache {
    /// Create a cache with a memory budget and an optional TTL.
    ///
    /// A `ttl` of `None` keeps entries until they are evicted.
    pub fn new(max_size_mb: usize, ttl: Option<Duration>) -> Self {
        Self::with_max_bytes((max_size_mb as u64) * 1024 * 1024, ttl)
    }

    /// Create a cache with a budget in bytes.
    pub fn with_max_bytes(max_bytes: u64, ttl: Option<Duration>) -> Self {
        Self {
            // Eviction is driven by the byte budget, so the entry count is unbounded.
            cache: Arc::new(RwLock::new(LruCache::unbounded())),
            max_bytes,
            ttl,
            stats: Arc::new(MemoryCacheStats::default()),
        }
    }

    fn entry_size(key: &str, data: &Bytes) -> u64 {
        (key.len() + data.len()) as u64
    }

    /// Free ~5% of the budget, least recently used first. Caller holds the lock.
    fn evict_batch_locked(&self, cache: &mut LruCache<String, CachedEntry>) {
        let target_free = (self.max_bytes / 20).max(1);
        let mut bytes_freed = 0u64;
        let mut entries_evicted = 0u64;

        while bytes_freed < target_free {
            match cache.pop_lru() {
                Some((key, evicted)) => {
                    bytes_freed += Self::entry_size(&key, &evicted.data);
                    entries_evicted += 1;
                }
                None => break,
            }
        }

        self.stats.size_bytes.fetch_sub(bytes_freed, Ordering::Relaxed);
        self.stats
            .entry_count
            .fetch_sub(entries_evicted, Ordering::Relaxed);
        self.stats
            .evictions
            .fetch_add(entries_evicted, Ordering::Relaxed);

        debug!(
            entries_evicted = entries_evicted,
            bytes_freed = bytes_freed,
            max_bytes = self.max_bytes,
            "Memory cache batch eviction"
        );
    }

    /// Shared handle to the counters.
    pub fn stats(&self) -> Arc<MemoryCacheStats> {
        Arc::clone(&self.stats)
    }

    pub fn len(&self) -> usize {
        self.stats.entry_count.load(Ordering::Relaxed) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn size_bytes(&self) -> u64 {
        self.stats.size_bytes.load(Ordering::Relaxed)
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Drop every entry. Counters other than size and count are kept.
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.clear();
        self.stats.size_bytes.store(0, Ordering::Relaxed);
        self.stats.entry_count.store(0, Ordering::Relaxed);
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Option<Bytes> {
        // Write lock: a hit promotes the entry in LRU order.
        let mut cache = self.cache.write().await;

        let expired = match cache.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.data.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            if let Some(entry) = cache.pop(key) {
                self.stats
                    .size_bytes
                    .fetch_sub(Self::entry_size(key, &entry.data), Ordering::Relaxed);
                self.stats.entry_count.fetch_sub(1, Ordering::Relaxed);
                self.stats.expired.fetch_add(1, Ordering::Relaxed);
            }
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    async fn set(&self, key: &str, value: Bytes) {
        let size = Self::entry_size(key, &value);
        let mut cache = self.cache.write().await;

        if let Some(existing) = cache.pop(key) {
            self.stats
                .size_bytes
                .fetch_sub(Self::entry_size(key, &existing.data), Ordering::Relaxed);
            self.stats.entry_count.fetch_sub(1, Ordering::Relaxed);
        }

        if size > self.max_bytes {
            debug!(
                key = %key,
                size = size,
                max_bytes = self.max_bytes,
                "Value larger than the memory cache budget, not stored"
            );
            return;
        }

        while self.stats.size_bytes.load(Ordering::Relaxed) + size > self.max_bytes
            && !cache.is_empty()
        {
            self.evict_batch_locked(&mut cache);
        }

        cache.put(
            key.to_string(),
            CachedEntry {
                data: value,
                inserted_at: Instant::now(),
                ttl: self.ttl,
            },
        );
        self.stats.size_bytes.fetch_add(size, Ordering::Relaxed);
        self.stats.entry_count.fetch_add(1, Ordering::Relaxed);
    }

    async fn remove(&self, key: &str) {
        let mut cache = self.cache.write().await;
        if let Some(entry) = cache.pop(key) {
            self.stats
                .size_bytes
                .fetch_sub(Self::entry_size(key, &entry.data), Ordering::Relaxed);
            self.stats.entry_count.fetch_sub(1, Ordering::Relaxed);
        }
    }
}
