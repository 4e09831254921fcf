//! Catalog-level calls: latest version, configuration, layer versions.

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use olp_common::model::{Catalog, LayerVersions};
use olp_common::{Hrn, OlpResult, ServiceName};

use crate::api::{config, metadata};
use crate::resolver::ServiceResolver;
use crate::settings::ClientSettings;

/// "No version known yet" marker for the latest-version search.
const NO_KNOWN_VERSION: i64 = -1;

/// Client for one catalog.
#[derive(Clone)]
pub struct CatalogClient {
    hrn: Hrn,
    resolver: ServiceResolver,
}

impl CatalogClient {
    pub fn new(hrn: Hrn, settings: &ClientSettings) -> Self {
        Self {
            hrn,
            resolver: ServiceResolver::new(settings),
        }
    }

    pub fn hrn(&self) -> &Hrn {
        &self.hrn
    }

    /// Latest catalog version.
    ///
    /// Never cached: the platform may publish a new version between two
    /// calls, so every call asks the metadata service again. Only the
    /// metadata endpoint itself comes from the endpoint cache.
    #[instrument(skip(self, cancel), fields(hrn = %self.hrn))]
    pub async fn latest_version(
        &self,
        billing_tag: Option<&str>,
        cancel: Option<&CancellationToken>,
    ) -> OlpResult<u64> {
        let ctx = self
            .resolver
            .request_context(ServiceName::Metadata, Some(&self.hrn), cancel)
            .await?;
        let latest = metadata::latest_version(&ctx, NO_KNOWN_VERSION, billing_tag).await?;
        debug!(version = latest.version, "Resolved latest catalog version");
        Ok(latest.version)
    }

    /// Use `version` if given, otherwise ask for the latest one.
    pub async fn effective_version(
        &self,
        version: Option<u64>,
        billing_tag: Option<&str>,
        cancel: Option<&CancellationToken>,
    ) -> OlpResult<u64> {
        match version {
            Some(version) => Ok(version),
            None => self.latest_version(billing_tag, cancel).await,
        }
    }

    /// Catalog configuration document from the config service.
    #[instrument(skip(self, cancel), fields(hrn = %self.hrn))]
    pub async fn get_catalog(
        &self,
        billing_tag: Option<&str>,
        cancel: Option<&CancellationToken>,
    ) -> OlpResult<Catalog> {
        let ctx = self
            .resolver
            .request_context(ServiceName::Config, None, cancel)
            .await?;
        config::get_catalog(&ctx, &self.hrn, billing_tag).await
    }

    /// Layer versions for a catalog version (latest when unset).
    #[instrument(skip(self, cancel), fields(hrn = %self.hrn))]
    pub async fn layer_versions(
        &self,
        version: Option<u64>,
        billing_tag: Option<&str>,
        cancel: Option<&CancellationToken>,
    ) -> OlpResult<LayerVersions> {
        let version = self.effective_version(version, billing_tag, cancel).await?;
        let ctx = self
            .resolver
            .request_context(ServiceName::Metadata, Some(&self.hrn), cancel)
            .await?;
        metadata::layer_versions(&ctx, version, billing_tag).await
    }
}
