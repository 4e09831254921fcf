//! Wire models for the lookup, metadata, query and config services.
//!
//! Field names follow the platform's JSON (camelCase). Everything not needed
//! for resolution is optional so that newer service versions keep decoding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Lookup service
// ============================================================================

/// One candidate endpoint returned by the API lookup service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEndpoint {
    pub api: String,
    pub version: String,
    #[serde(rename = "baseURL", default)]
    pub base_url: String,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

/// Error document the lookup service returns for an unregistered API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiNotFoundError {
    pub status: u16,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

/// Either shape a lookup call can answer with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LookupResponse {
    Endpoints(Vec<ApiEndpoint>),
    NotFound(ApiNotFoundError),
}

// ============================================================================
// Metadata service
// ============================================================================

/// Response of `versions/latest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: u64,
}

/// Per-layer versions for one catalog version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerVersions {
    pub version: u64,
    #[serde(default)]
    pub layer_versions: Vec<LayerVersion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerVersion {
    pub layer: String,
    pub version: u64,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// Metadata of a single partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partition {
    pub partition: String,
    #[serde(default)]
    pub data_handle: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(default)]
    pub crc: Option<String>,
    #[serde(default)]
    pub data_size: Option<i64>,
    #[serde(default)]
    pub compressed_data_size: Option<i64>,
}

/// A flat partition listing (metadata full-layer listing or query by id).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Partitions {
    #[serde(default)]
    pub partitions: Vec<Partition>,
}

impl Partitions {
    /// Find the entry for a partition id.
    pub fn find(&self, partition_id: &str) -> Option<&Partition> {
        self.partitions.iter().find(|p| p.partition == partition_id)
    }
}

// ============================================================================
// Query service (quad tree)
// ============================================================================

/// Quad-tree index for a tile: the tile's sub-quads plus its ancestors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuadTreeIndex {
    #[serde(default)]
    pub sub_quads: Vec<SubQuad>,
    #[serde(default)]
    pub parent_quads: Vec<ParentQuad>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubQuad {
    /// Key relative to the requested tile
    #[serde(default)]
    pub sub_quad_key: String,
    #[serde(default)]
    pub version: Option<u64>,
    pub data_handle: String,
    #[serde(default)]
    pub data_size: Option<i64>,
    #[serde(default)]
    pub checksum: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentQuad {
    pub partition: String,
    #[serde(default)]
    pub version: Option<u64>,
    pub data_handle: String,
    #[serde(default)]
    pub data_size: Option<i64>,
}

// ============================================================================
// Config service
// ============================================================================

/// Catalog configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub id: String,
    pub hrn: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub version: Option<u64>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

impl Catalog {
    /// Find a layer by id.
    pub fn layer(&self, layer_id: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == layer_id)
    }
}

/// Layer configuration inside a catalog document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: String,
    #[serde(default)]
    pub hrn: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub layer_type: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub partitioning: Option<Partitioning>,
    /// Fields this client does not interpret, kept so cached documents
    /// round-trip unchanged.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Layer {
    pub fn is_versioned(&self) -> bool {
        self.layer_type.as_deref() == Some("versioned")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partitioning {
    pub scheme: String,
    #[serde(default)]
    pub tile_levels: Vec<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_response_endpoints() {
        let json = r#"[{"api":"blob","version":"v1","baseURL":"https://blob.example.com/blob/v1","parameters":{}}]"#;
        let parsed: LookupResponse = serde_json::from_str(json).unwrap();
        match parsed {
            LookupResponse::Endpoints(endpoints) => {
                assert_eq!(endpoints.len(), 1);
                assert_eq!(endpoints[0].base_url, "https://blob.example.com/blob/v1");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_lookup_response_not_found() {
        let json = r#"{"status":404,"title":"Service not found","detail":[]}"#;
        let parsed: LookupResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            parsed,
            LookupResponse::NotFound(ApiNotFoundError { status: 404, .. })
        ));
    }

    #[test]
    fn test_catalog_layer_lookup_and_extras() {
        let json = r#"{
            "id": "rib-2",
            "hrn": "hrn:here:data::olp-here:rib-2",
            "name": "RIB",
            "layers": [
                {"id": "topology-geometry", "layerType": "versioned", "ttl": 3600},
                {"id": "roads"}
            ],
            "created": "2019-06-01T10:00:00Z"
        }"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        let layer = catalog.layer("topology-geometry").unwrap();
        assert!(layer.is_versioned());
        assert_eq!(layer.extra.get("ttl"), Some(&serde_json::json!(3600)));
        assert!(catalog.layer("missing").is_none());
        assert!(catalog.created.is_some());
    }

    #[test]
    fn test_quad_tree_index_defaults() {
        let json = r#"{"subQuads":[{"subQuadKey":"1","version":3,"dataHandle":"H1"}]}"#;
        let index: QuadTreeIndex = serde_json::from_str(json).unwrap();
        assert_eq!(index.sub_quads[0].data_handle, "H1");
        assert!(index.parent_quads.is_empty());
    }
}
