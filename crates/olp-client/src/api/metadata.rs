//! Metadata service: catalog versions and full-layer partition listings.

use olp_common::model::{LayerVersions, Partitions, VersionResponse};
use olp_common::OlpResult;

use crate::context::{billing_query, RequestContext};

/// Latest catalog version, searching from `start_version` (-1 when unknown).
pub async fn latest_version(
    ctx: &RequestContext,
    start_version: i64,
    billing_tag: Option<&str>,
) -> OlpResult<VersionResponse> {
    let mut query = vec![("startVersion", start_version.to_string())];
    query.extend(billing_query(billing_tag));
    ctx.get_json(&["versions", "latest"], &query).await
}

/// Every partition of a layer at a catalog version.
pub async fn partitions(
    ctx: &RequestContext,
    layer_id: &str,
    version: u64,
    billing_tag: Option<&str>,
) -> OlpResult<Partitions> {
    let mut query = vec![("version", version.to_string())];
    query.extend(billing_query(billing_tag));
    ctx.get_json(&["layers", layer_id, "partitions"], &query).await
}

/// Layer versions making up a catalog version.
pub async fn layer_versions(
    ctx: &RequestContext,
    version: u64,
    billing_tag: Option<&str>,
) -> OlpResult<LayerVersions> {
    let mut query = vec![("version", version.to_string())];
    query.extend(billing_query(billing_tag));
    ctx.get_json(&["layerVersions"], &query).await
}
