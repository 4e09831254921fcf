//! Reads partitions of one versioned layer.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use olp_common::model::{Partitions, QuadTreeIndex};
use olp_common::{Hrn, OlpError, OlpResult, QuadKey, ServiceName};

use crate::api::{blob, metadata, query};
use crate::catalog_client::CatalogClient;
use crate::request::{
    DataRequest, PartitionAddress, PartitionsMetadata, PartitionsQuery, PartitionsRequest,
    QuadKeyPartitionsRequest,
};
use crate::resolver::ServiceResolver;
use crate::settings::ClientSettings;
use crate::transport::HttpResponse;

/// Client for one layer of a catalog.
#[derive(Clone)]
pub struct VersionedLayerClient {
    hrn: Hrn,
    layer_id: String,
    catalog: CatalogClient,
    resolver: ServiceResolver,
}

impl VersionedLayerClient {
    pub fn new(hrn: Hrn, layer_id: impl Into<String>, settings: ClientSettings) -> Self {
        Self {
            catalog: CatalogClient::new(hrn.clone(), &settings),
            resolver: ServiceResolver::new(&settings),
            hrn,
            layer_id: layer_id.into(),
        }
    }

    pub fn hrn(&self) -> &Hrn {
        &self.hrn
    }

    pub fn layer_id(&self) -> &str {
        &self.layer_id
    }

    /// Download a partition payload.
    ///
    /// The returned response is successful and its body has not been read.
    #[instrument(skip(self, request, cancel), fields(hrn = %self.hrn, layer = %self.layer_id))]
    pub async fn get_data(
        &self,
        request: &DataRequest,
        cancel: Option<&CancellationToken>,
    ) -> OlpResult<HttpResponse> {
        let billing_tag = request.billing_tag();
        let data_handle = match request.address()? {
            PartitionAddress::DataHandle(handle) => handle,
            PartitionAddress::PartitionId { id, version } => {
                self.data_handle_for_partition(&id, version, billing_tag, cancel)
                    .await?
            }
            PartitionAddress::QuadKey {
                key,
                version,
                depth,
            } => {
                self.data_handle_for_tile(key, version, depth, billing_tag, cancel)
                    .await?
            }
        };

        debug!(data_handle = %data_handle, "Downloading blob");
        let ctx = self
            .resolver
            .request_context(ServiceName::Blob, Some(&self.hrn), cancel)
            .await?;
        blob::get_blob(&ctx, &self.layer_id, &data_handle, billing_tag).await
    }

    async fn data_handle_for_partition(
        &self,
        partition_id: &str,
        version: Option<u64>,
        billing_tag: Option<&str>,
        cancel: Option<&CancellationToken>,
    ) -> OlpResult<String> {
        let version = self
            .catalog
            .effective_version(version, billing_tag, cancel)
            .await?;
        let ctx = self
            .resolver
            .request_context(ServiceName::Query, Some(&self.hrn), cancel)
            .await?;
        let ids = [partition_id.to_string()];
        let partitions =
            query::partitions_by_id(&ctx, &self.layer_id, &ids, Some(version), billing_tag)
                .await?;

        partitions
            .find(partition_id)
            .and_then(|partition| partition.data_handle.clone())
            .filter(|handle| !handle.is_empty())
            .ok_or_else(|| OlpError::PartitionNotFound {
                partition: partition_id.to_string(),
                hrn: self.hrn.to_string(),
            })
    }

    async fn data_handle_for_tile(
        &self,
        key: QuadKey,
        version: Option<u64>,
        depth: u32,
        billing_tag: Option<&str>,
        cancel: Option<&CancellationToken>,
    ) -> OlpResult<String> {
        let request = QuadKeyPartitionsRequest::new(key)
            .with_version(version)
            .with_depth(depth)
            .with_billing_tag(billing_tag.map(str::to_string));
        let index = self.quad_tree_index(&request, cancel).await?;

        // Only the first sub-quad is downloaded, even when the index holds
        // more (depth > 0).
        if index.sub_quads.len() > 1 {
            warn!(
                sub_quads = index.sub_quads.len(),
                "Quad-tree index has several sub-quads, using the first"
            );
        }
        index
            .sub_quads
            .into_iter()
            .next()
            .map(|sub_quad| sub_quad.data_handle)
            .filter(|handle| !handle.is_empty())
            .ok_or_else(|| OlpError::PartitionNotFound {
                partition: key.to_here_tile().to_string(),
                hrn: self.hrn.to_string(),
            })
    }

    /// Partition metadata, spatial or flat depending on the query shape.
    pub async fn get_partitions(
        &self,
        request: impl Into<PartitionsQuery>,
        cancel: Option<&CancellationToken>,
    ) -> OlpResult<PartitionsMetadata> {
        match request.into() {
            PartitionsQuery::Spatial(request) => self
                .quad_tree_index(&request, cancel)
                .await
                .map(PartitionsMetadata::Index),
            PartitionsQuery::Flat(request) => self
                .partitions(&request, cancel)
                .await
                .map(PartitionsMetadata::Partitions),
        }
    }

    /// Quad-tree index below a tile. An unset version resolves to latest.
    #[instrument(skip(self, request, cancel), fields(hrn = %self.hrn, layer = %self.layer_id, tile = %request.quad_key))]
    pub async fn quad_tree_index(
        &self,
        request: &QuadKeyPartitionsRequest,
        cancel: Option<&CancellationToken>,
    ) -> OlpResult<QuadTreeIndex> {
        request.validate()?;
        let billing_tag = request.billing_tag.as_deref();
        let version = self
            .catalog
            .effective_version(request.version, billing_tag, cancel)
            .await?;

        let ctx = self
            .resolver
            .request_context(ServiceName::Query, Some(&self.hrn), cancel)
            .await?;
        let index = query::quad_tree_index(
            &ctx,
            &self.layer_id,
            version,
            &request.quad_key,
            request.depth,
            billing_tag,
        )
        .await?;
        info!(
            version,
            sub_quads = index.sub_quads.len(),
            parent_quads = index.parent_quads.len(),
            "Fetched quad-tree index"
        );
        Ok(index)
    }

    /// Flat partition metadata: selected ids through the query service, or
    /// the whole layer through the metadata service.
    #[instrument(skip(self, request, cancel), fields(hrn = %self.hrn, layer = %self.layer_id))]
    pub async fn partitions(
        &self,
        request: &PartitionsRequest,
        cancel: Option<&CancellationToken>,
    ) -> OlpResult<Partitions> {
        let billing_tag = request.billing_tag.as_deref();

        if let Some(ids) = request.ids() {
            let ctx = self
                .resolver
                .request_context(ServiceName::Query, Some(&self.hrn), cancel)
                .await?;
            return query::partitions_by_id(&ctx, &self.layer_id, ids, request.version, billing_tag)
                .await;
        }

        let version = self
            .catalog
            .effective_version(request.version, billing_tag, cancel)
            .await?;
        let ctx = self
            .resolver
            .request_context(ServiceName::Metadata, Some(&self.hrn), cancel)
            .await?;
        let partitions = metadata::partitions(&ctx, &self.layer_id, version, billing_tag).await?;
        info!(version, count = partitions.partitions.len(), "Listed layer partitions");
        Ok(partitions)
    }
}
