//! Connects to a layer of a catalog through the catalog config cache.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use olp_cache::CatalogConfigCache;
use olp_common::model::Layer;
use olp_common::{Hrn, OlpError, OlpResult};

use crate::catalog_client::CatalogClient;
use crate::settings::ClientSettings;
use crate::versioned_layer::VersionedLayerClient;

/// Produces `CatalogLayer` handles from catalog configuration documents.
#[derive(Clone)]
pub struct LayerDataProvider {
    settings: ClientSettings,
    config_cache: CatalogConfigCache,
}

impl LayerDataProvider {
    pub fn new(settings: ClientSettings) -> Self {
        Self {
            config_cache: CatalogConfigCache::new(settings.cache.clone()),
            settings,
        }
    }

    /// Bind to `layer_id` of the catalog at `version` (latest when unset).
    ///
    /// Concurrent calls without a version may each resolve latest and
    /// populate the cache independently; the last write wins.
    pub async fn connect(
        &self,
        hrn: &Hrn,
        layer_id: &str,
        version: Option<u64>,
    ) -> OlpResult<CatalogLayer> {
        self.connect_with_cancel(hrn, layer_id, version, None).await
    }

    #[instrument(skip(self, hrn, cancel), fields(hrn = %hrn))]
    pub async fn connect_with_cancel(
        &self,
        hrn: &Hrn,
        layer_id: &str,
        version: Option<u64>,
        cancel: Option<&CancellationToken>,
    ) -> OlpResult<CatalogLayer> {
        let catalog_client = CatalogClient::new(hrn.clone(), &self.settings);
        let version = catalog_client
            .effective_version(version, None, cancel)
            .await?;

        let catalog = match self.config_cache.get(hrn, layer_id, version).await {
            Some(catalog) => catalog,
            None => {
                debug!(version, "Fetching catalog configuration");
                let catalog = catalog_client.get_catalog(None, cancel).await?;
                self.config_cache
                    .put(hrn, layer_id, version, &catalog)
                    .await;
                catalog
            }
        };

        let layer = catalog
            .layer(layer_id)
            .cloned()
            .ok_or_else(|| OlpError::LayerNotFound {
                layer: layer_id.to_string(),
                hrn: hrn.to_string(),
            })?;

        info!(layer = %layer.id, version, "Connected to catalog layer");
        Ok(CatalogLayer {
            layer,
            hrn: hrn.clone(),
            layer_id: layer_id.to_string(),
            version,
            settings: self.settings.clone(),
        })
    }
}

/// A layer configuration bound to its catalog and client settings.
#[derive(Clone)]
pub struct CatalogLayer {
    layer: Layer,
    hrn: Hrn,
    layer_id: String,
    version: u64,
    settings: ClientSettings,
}

impl CatalogLayer {
    pub fn layer(&self) -> &Layer {
        &self.layer
    }

    pub fn hrn(&self) -> &Hrn {
        &self.hrn
    }

    pub fn layer_id(&self) -> &str {
        &self.layer_id
    }

    /// Catalog version the configuration was read at.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Partition client scoped to this layer.
    pub fn versioned_client(&self) -> VersionedLayerClient {
        VersionedLayerClient::new(self.hrn.clone(), self.layer_id.clone(), self.settings.clone())
    }
}

impl std::fmt::Debug for CatalogLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogLayer")
            .field("hrn", &self.hrn)
            .field("layer_id", &self.layer_id)
            .field("version", &self.version)
            .finish()
    }
}
