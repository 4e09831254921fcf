//! Connecting to catalog layers and listing partition metadata.

use std::sync::Arc;

use olp_client::{
    LayerDataProvider, OlpError, PartitionsMetadata, PartitionsRequest, QuadKey,
    QuadKeyPartitionsRequest,
};
use test_utils::{
    assert_err_matches, base_url, catalog, catalog_hrn, latest_version, lookup_endpoints,
    partitions, quad_tree_index, settings_for, MockTransport, CATALOG_HRN,
};

fn platform() -> Arc<MockTransport> {
    let transport = Arc::new(MockTransport::new());
    transport.respond_json(
        "/apis/metadata/",
        200,
        lookup_endpoints("metadata", base_url::METADATA),
    );
    transport.respond_json("/apis/query/", 200, lookup_endpoints("query", base_url::QUERY));
    transport.respond_json(
        "/platform/apis/config/",
        200,
        lookup_endpoints("config", base_url::CONFIG),
    );
    transport.respond_json("/catalogs/", 200, catalog(&["a", "b"]));
    transport
}

#[tokio::test]
async fn test_connect_returns_bound_layer() {
    let transport = platform();
    let provider = LayerDataProvider::new(settings_for(transport.clone()));

    let layer = provider.connect(&catalog_hrn(), "b", Some(3)).await.unwrap();

    assert_eq!(layer.layer_id(), "b");
    assert_eq!(layer.layer().id, "b");
    assert!(layer.layer().is_versioned());
    assert_eq!(layer.version(), 3);
    assert_eq!(layer.hrn().to_string(), CATALOG_HRN);
    assert_eq!(
        transport.count_matching(&format!("{}/catalogs/{}", base_url::CONFIG, CATALOG_HRN)),
        1
    );
}

#[tokio::test]
async fn test_unknown_layer_is_not_found() {
    let transport = platform();
    let provider = LayerDataProvider::new(settings_for(transport.clone()));

    let result = provider.connect(&catalog_hrn(), "c", Some(1)).await;

    let err = result.unwrap_err();
    assert!(matches!(err, OlpError::LayerNotFound { ref layer, .. } if layer == "c"));
    assert_eq!(
        err.to_string(),
        format!("There is no layer c in this catalog. HRN: {}", CATALOG_HRN)
    );
}

#[tokio::test]
async fn test_second_connect_uses_cached_config() {
    let transport = platform();
    let provider = LayerDataProvider::new(settings_for(transport.clone()));
    let hrn = catalog_hrn();

    provider.connect(&hrn, "a", Some(5)).await.unwrap();
    provider.connect(&hrn, "a", Some(5)).await.unwrap();

    assert_eq!(transport.count_matching("/catalogs/"), 1);
    assert_eq!(transport.count_matching("/versions/latest"), 0);
}

#[tokio::test]
async fn test_new_version_fetches_config_again() {
    let transport = platform();
    let provider = LayerDataProvider::new(settings_for(transport.clone()));
    let hrn = catalog_hrn();

    provider.connect(&hrn, "a", Some(5)).await.unwrap();
    provider.connect(&hrn, "a", Some(6)).await.unwrap();

    assert_eq!(transport.count_matching("/catalogs/"), 2);
}

#[tokio::test]
async fn test_connect_without_version_resolves_latest_each_time() {
    let transport = platform();
    transport.respond_json("/versions/latest", 200, latest_version(9));
    let provider = LayerDataProvider::new(settings_for(transport.clone()));
    let hrn = catalog_hrn();

    let layer = provider.connect(&hrn, "a", None).await.unwrap();
    provider.connect(&hrn, "a", None).await.unwrap();

    assert_eq!(layer.version(), 9);
    assert_eq!(transport.count_matching("/versions/latest"), 2);
    assert_eq!(transport.count_matching("/catalogs/"), 1);
}

#[tokio::test]
async fn test_spatial_partitions_from_layer_handle() {
    let transport = platform();
    transport.respond_json("/quadkeys/", 200, quad_tree_index(&["H1", "H2"]));
    let provider = LayerDataProvider::new(settings_for(transport.clone()));
    let client = provider
        .connect(&catalog_hrn(), "a", Some(2))
        .await
        .unwrap()
        .versioned_client();

    let request = QuadKeyPartitionsRequest::new(QuadKey::new(2, 1, 3).unwrap())
        .with_version(Some(2))
        .with_depth(1);
    let index = client
        .get_partitions(request, None)
        .await
        .unwrap()
        .into_index()
        .unwrap();

    assert_eq!(index.sub_quads.len(), 2);
    assert!(transport.calls().contains(&format!(
        "{}/layers/a/versions/2/quadkeys/{}/depths/1",
        base_url::QUERY,
        QuadKey::new(2, 1, 3).unwrap().to_here_tile()
    )));
}

#[tokio::test]
async fn test_spatial_depth_over_limit_is_invalid() {
    let transport = platform();
    let client = LayerDataProvider::new(settings_for(transport.clone()))
        .connect(&catalog_hrn(), "a", Some(2))
        .await
        .unwrap()
        .versioned_client();
    let calls_before = transport.calls().len();

    let request = QuadKeyPartitionsRequest::new(QuadKey::new(0, 0, 0).unwrap()).with_depth(5);
    let result = client.get_partitions(request, None).await;

    assert_err_matches!(result, OlpError::InvalidRequest(_));
    assert_eq!(transport.calls().len(), calls_before);
}

#[tokio::test]
async fn test_flat_partitions_by_id() {
    let transport = platform();
    transport.respond_json(
        "/layers/a/partitions?partition=x&partition=y",
        200,
        partitions(&[("x", "Hx"), ("y", "Hy")]),
    );
    let client = LayerDataProvider::new(settings_for(transport.clone()))
        .connect(&catalog_hrn(), "a", Some(4))
        .await
        .unwrap()
        .versioned_client();

    let request = PartitionsRequest::new()
        .with_partition_ids(vec!["x".to_string(), "y".to_string()])
        .with_version(Some(4));
    let result = client.get_partitions(request, None).await.unwrap();

    let PartitionsMetadata::Partitions(listed) = result else {
        panic!("expected a flat partition list");
    };
    assert_eq!(listed.partitions.len(), 2);
    assert_eq!(
        listed.find("y").and_then(|p| p.data_handle.as_deref()),
        Some("Hy")
    );
}

#[tokio::test]
async fn test_flat_partitions_without_ids_lists_whole_layer() {
    let transport = platform();
    transport.respond_json("/versions/latest", 200, latest_version(8));
    transport.respond_json(
        "metadata.mock/metadata/v1/layers/a/partitions",
        200,
        partitions(&[("x", "Hx")]),
    );
    let client = LayerDataProvider::new(settings_for(transport.clone()))
        .connect(&catalog_hrn(), "a", Some(8))
        .await
        .unwrap()
        .versioned_client();

    let listed = client
        .get_partitions(PartitionsRequest::new().with_partition_ids(vec![]), None)
        .await
        .unwrap()
        .into_partitions()
        .unwrap();

    assert_eq!(listed.partitions.len(), 1);
    assert!(transport.calls().contains(&format!(
        "{}/layers/a/partitions?version=8",
        base_url::METADATA
    )));
}
