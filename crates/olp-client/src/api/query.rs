//! Query service: partitions by id and quad-tree indexes.

use olp_common::model::{Partitions, QuadTreeIndex};
use olp_common::{OlpResult, QuadKey};

use crate::context::{billing_query, RequestContext};

/// Metadata for the given partition ids. Ids the layer does not have are
/// left out of the result.
pub async fn partitions_by_id(
    ctx: &RequestContext,
    layer_id: &str,
    partition_ids: &[String],
    version: Option<u64>,
    billing_tag: Option<&str>,
) -> OlpResult<Partitions> {
    let mut query: Vec<(&str, String)> = partition_ids
        .iter()
        .map(|id| ("partition", id.clone()))
        .collect();
    if let Some(version) = version {
        query.push(("version", version.to_string()));
    }
    query.extend(billing_query(billing_tag));
    ctx.get_json(&["layers", layer_id, "partitions"], &query).await
}

/// Quad-tree index of a tile down to `depth` levels.
pub async fn quad_tree_index(
    ctx: &RequestContext,
    layer_id: &str,
    version: u64,
    quad_key: &QuadKey,
    depth: u32,
    billing_tag: Option<&str>,
) -> OlpResult<QuadTreeIndex> {
    let version = version.to_string();
    let tile = quad_key.to_here_tile().to_string();
    let depth = depth.to_string();
    ctx.get_json(
        &[
            "layers",
            layer_id,
            "versions",
            version.as_str(),
            "quadkeys",
            tile.as_str(),
            "depths",
            depth.as_str(),
        ],
        &billing_query(billing_tag),
    )
    .await
}
