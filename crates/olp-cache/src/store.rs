//! The capability interface shared by all cache backends.

use async_trait::async_trait;
use bytes::Bytes;

/// A best-effort key/value store.
///
/// Implementations must tolerate concurrent calls from independent
/// resolutions. Writes are idempotent overwrites; there is no invalidation
/// protocol beyond the key structure and whatever expiry the store applies.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a value, `None` if absent or expired.
    async fn get(&self, key: &str) -> Option<Bytes>;

    /// Store a value, replacing any previous one.
    async fn set(&self, key: &str, value: Bytes);

    /// Drop a value if present.
    async fn remove(&self, key: &str);
}

/// A store that keeps nothing; every `get` misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

#[async_trait]
impl CacheStore for NoopCache {
    async fn get(&self, _key: &str) -> Option<Bytes> {
        None
    }

    async fn set(&self, _key: &str, _value: Bytes) {}

    async fn remove(&self, _key: &str) {}
}
