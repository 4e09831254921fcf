//! Cache of resolved service base URLs.

use bytes::Bytes;
use metrics::counter;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use olp_common::{Hrn, ServiceName};

use crate::store::CacheStore;

/// Key for a resolved endpoint: service, service version and, for
/// resource-scoped services, the catalog HRN.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointCacheKey {
    pub service: ServiceName,
    pub version: String,
    pub hrn: Option<Hrn>,
}

impl EndpointCacheKey {
    pub fn new(service: ServiceName, version: impl Into<String>, hrn: Option<&Hrn>) -> Self {
        Self {
            service,
            version: version.into(),
            hrn: hrn.cloned(),
        }
    }
}

impl fmt::Display for EndpointCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hrn {
            Some(hrn) => write!(f, "{}::{}::{}::api", hrn, self.service, self.version),
            None => write!(f, "platform::{}::{}::api", self.service, self.version),
        }
    }
}

/// Typed facade over a shared store mapping endpoint keys to base URLs.
#[derive(Clone)]
pub struct EndpointCache {
    store: Arc<dyn CacheStore>,
}

impl EndpointCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Get a cached base URL.
    pub async fn get(&self, key: &EndpointCacheKey) -> Option<String> {
        let cached = self
            .store
            .get(&key.to_string())
            .await
            .and_then(|raw| String::from_utf8(raw.to_vec()).ok());

        match &cached {
            Some(base_url) => {
                counter!("olp_endpoint_cache_hits_total").increment(1);
                debug!(key = %key, base_url = %base_url, "Endpoint cache hit");
            }
            None => {
                counter!("olp_endpoint_cache_misses_total").increment(1);
                debug!(key = %key, "Endpoint cache miss");
            }
        }

        cached
    }

    /// Store a base URL.
    pub async fn put(&self, key: &EndpointCacheKey, base_url: &str) {
        self.store
            .set(&key.to_string(), Bytes::copy_from_slice(base_url.as_bytes()))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryCache;

    fn catalog() -> Hrn {
        Hrn::parse("hrn:here:data::olp-here:rib-2").unwrap()
    }

    #[test]
    fn test_key_format() {
        let hrn = catalog();
        let scoped = EndpointCacheKey::new(ServiceName::Blob, "v1", Some(&hrn));
        assert_eq!(scoped.to_string(), "hrn:here:data::olp-here:rib-2::blob::v1::api");

        let platform = EndpointCacheKey::new(ServiceName::Config, "v1", None);
        assert_eq!(platform.to_string(), "platform::config::v1::api");
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = EndpointCache::new(Arc::new(MemoryCache::new(1, None)));
        let hrn = catalog();
        let key = EndpointCacheKey::new(ServiceName::Query, "v1", Some(&hrn));

        assert!(cache.get(&key).await.is_none());
        cache.put(&key, "https://query.example.com/query/v1").await;
        assert_eq!(
            cache.get(&key).await.as_deref(),
            Some("https://query.example.com/query/v1")
        );
    }

    #[tokio::test]
    async fn test_scope_is_part_of_the_key() {
        let cache = EndpointCache::new(Arc::new(MemoryCache::new(1, None)));
        let hrn = catalog();
        let scoped = EndpointCacheKey::new(ServiceName::Metadata, "v1", Some(&hrn));
        let platform = EndpointCacheKey::new(ServiceName::Metadata, "v1", None);
        let other_version = EndpointCacheKey::new(ServiceName::Metadata, "v2", Some(&hrn));

        cache.put(&scoped, "https://metadata.example.com").await;

        assert!(cache.get(&platform).await.is_none());
        assert!(cache.get(&other_version).await.is_none());
    }
}
