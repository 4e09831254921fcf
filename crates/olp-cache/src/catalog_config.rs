//! Cache of catalog configuration documents, one entry per catalog version.

use bytes::Bytes;
use metrics::counter;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use olp_common::model::Catalog;
use olp_common::Hrn;

use crate::store::CacheStore;

/// Key for a cached catalog document. Each version is a separate entry;
/// a newer catalog version never invalidates an older one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogConfigCacheKey {
    pub hrn: Hrn,
    pub layer_id: String,
    pub version: u64,
}

impl CatalogConfigCacheKey {
    pub fn new(hrn: &Hrn, layer_id: impl Into<String>, version: u64) -> Self {
        Self {
            hrn: hrn.clone(),
            layer_id: layer_id.into(),
            version,
        }
    }
}

impl fmt::Display for CatalogConfigCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}::catalog", self.hrn, self.layer_id, self.version)
    }
}

/// Typed facade storing catalog documents as JSON in a shared store.
#[derive(Clone)]
pub struct CatalogConfigCache {
    store: Arc<dyn CacheStore>,
}

impl CatalogConfigCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Get a cached catalog. An entry that no longer decodes counts as a miss.
    pub async fn get(&self, hrn: &Hrn, layer_id: &str, version: u64) -> Option<Catalog> {
        let key = CatalogConfigCacheKey::new(hrn, layer_id, version);
        let Some(raw) = self.store.get(&key.to_string()).await else {
            counter!("olp_catalog_cache_misses_total").increment(1);
            debug!(key = %key, "Catalog config cache miss");
            return None;
        };

        match serde_json::from_slice::<Catalog>(&raw) {
            Ok(catalog) => {
                counter!("olp_catalog_cache_hits_total").increment(1);
                debug!(key = %key, "Catalog config cache hit");
                Some(catalog)
            }
            Err(e) => {
                counter!("olp_catalog_cache_misses_total").increment(1);
                warn!(key = %key, error = %e, "Discarding undecodable cached catalog");
                None
            }
        }
    }

    /// Store a catalog document.
    pub async fn put(&self, hrn: &Hrn, layer_id: &str, version: u64, catalog: &Catalog) {
        let key = CatalogConfigCacheKey::new(hrn, layer_id, version);
        match serde_json::to_vec(catalog) {
            Ok(encoded) => self.store.set(&key.to_string(), Bytes::from(encoded)).await,
            Err(e) => warn!(key = %key, error = %e, "Failed to encode catalog for cache"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CacheStore, MemoryCache};

    fn catalog_doc() -> Catalog {
        serde_json::from_value(serde_json::json!({
            "id": "rib-2",
            "hrn": "hrn:here:data::olp-here:rib-2",
            "layers": [{"id": "a"}, {"id": "b"}]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_put_then_get_same_version() {
        let cache = CatalogConfigCache::new(Arc::new(MemoryCache::new(1, None)));
        let hrn = Hrn::parse("hrn:here:data::olp-here:rib-2").unwrap();

        assert!(cache.get(&hrn, "a", 7).await.is_none());
        cache.put(&hrn, "a", 7, &catalog_doc()).await;

        assert_eq!(cache.get(&hrn, "a", 7).await, Some(catalog_doc()));
        // Other versions and layers are separate entries.
        assert!(cache.get(&hrn, "a", 8).await.is_none());
        assert!(cache.get(&hrn, "b", 7).await.is_none());
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss() {
        let store = Arc::new(MemoryCache::new(1, None));
        let hrn = Hrn::parse("hrn:here:data::olp-here:rib-2").unwrap();
        let key = CatalogConfigCacheKey::new(&hrn, "a", 1);
        store.set(&key.to_string(), Bytes::from("not json")).await;

        let cache = CatalogConfigCache::new(store);
        assert!(cache.get(&hrn, "a", 1).await.is_none());
    }
}
