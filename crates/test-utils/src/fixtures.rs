//! Common test fixtures for olp-read tests.
//!
//! Response bodies are shaped like the platform's REST services so they go
//! through the same decoding as real responses.

use serde_json::{json, Value};
use std::sync::Arc;

use olp_cache::MemoryCache;
use olp_client::settings::ClientSettings;
use olp_client::transport::Transport;
use olp_common::{Environment, Hrn};

/// Catalog used throughout the tests.
pub const CATALOG_HRN: &str = "hrn:here:data::olp-here:test-catalog";

/// Lookup service of the mock environment.
pub const LOOKUP_URL: &str = "https://lookup.mock/lookup/v1";

/// Resolved base URLs of the mock services.
pub mod base_url {
    pub const METADATA: &str = "https://metadata.mock/metadata/v1";
    pub const QUERY: &str = "https://query.mock/query/v1";
    pub const BLOB: &str = "https://blob.mock/blob/v1";
    pub const CONFIG: &str = "https://config.mock/config/v1";
}

pub fn catalog_hrn() -> Hrn {
    Hrn::parse(CATALOG_HRN).expect("fixture HRN is valid")
}

/// Settings pointing at the mock lookup URL with a fresh memory cache.
pub fn settings_for(transport: Arc<dyn Transport>) -> ClientSettings {
    ClientSettings::new(
        Environment::Custom(LOOKUP_URL.to_string()),
        transport,
        Arc::new(MemoryCache::new(8, None)),
    )
}

/// Lookup response listing one endpoint.
pub fn lookup_endpoints(api: &str, base_url: &str) -> Value {
    json!([{
        "api": api,
        "version": "v1",
        "baseURL": base_url,
        "parameters": {}
    }])
}

/// Lookup response for an unknown API.
pub fn lookup_not_found(title: &str) -> Value {
    json!({
        "status": 404,
        "title": title,
        "detail": [{ "name": "api", "error": "unknown" }]
    })
}

pub fn latest_version(version: u64) -> Value {
    json!({ "version": version })
}

/// Partition list; each entry is `(partition id, data handle)`.
pub fn partitions(entries: &[(&str, &str)]) -> Value {
    let partitions: Vec<Value> = entries
        .iter()
        .map(|(id, handle)| {
            json!({
                "partition": id,
                "dataHandle": handle,
                "version": 1,
                "dataSize": 128
            })
        })
        .collect();
    json!({ "partitions": partitions })
}

/// Quad-tree index whose sub-quads carry the given data handles.
pub fn quad_tree_index(data_handles: &[&str]) -> Value {
    let sub_quads: Vec<Value> = data_handles
        .iter()
        .enumerate()
        .map(|(i, handle)| {
            json!({
                "subQuadKey": (i + 1).to_string(),
                "version": 1,
                "dataHandle": handle,
                "dataSize": 256
            })
        })
        .collect();
    json!({ "subQuads": sub_quads, "parentQuads": [] })
}

/// Catalog configuration document with versioned layers of the given ids.
pub fn catalog(layer_ids: &[&str]) -> Value {
    let layers: Vec<Value> = layer_ids
        .iter()
        .map(|id| {
            json!({
                "id": id,
                "hrn": format!("{}:{}", CATALOG_HRN, id),
                "name": id,
                "layerType": "versioned",
                "contentType": "application/x-protobuf",
                "partitioning": { "scheme": "heretile", "tileLevels": [12] }
            })
        })
        .collect();
    json!({
        "id": "test-catalog",
        "hrn": CATALOG_HRN,
        "name": "Test catalog",
        "summary": "Catalog for tests",
        "layers": layers,
        "version": 3
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use olp_common::model::{Catalog, LookupResponse, QuadTreeIndex};

    #[test]
    fn test_fixture_hrn_parses() {
        assert_eq!(catalog_hrn().to_string(), CATALOG_HRN);
    }

    #[test]
    fn test_fixtures_decode_as_models() {
        let catalog: Catalog = serde_json::from_value(catalog(&["a", "b"])).unwrap();
        assert!(catalog.layer("b").is_some());

        let index: QuadTreeIndex =
            serde_json::from_value(quad_tree_index(&["H1", "H2"])).unwrap();
        assert_eq!(index.sub_quads[0].data_handle, "H1");

        let found: LookupResponse =
            serde_json::from_value(lookup_endpoints("blob", base_url::BLOB)).unwrap();
        assert!(matches!(found, LookupResponse::Endpoints(ref e) if e.len() == 1));

        let missing: LookupResponse =
            serde_json::from_value(lookup_not_found("Not Found")).unwrap();
        assert!(matches!(missing, LookupResponse::NotFound(ref n) if n.status == 404));
    }
}
