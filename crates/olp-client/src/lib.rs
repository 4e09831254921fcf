//! Read-side client for versioned catalog layers.
//!
//! Resolves service endpoints through the API lookup service, resolves
//! partition addresses to blob data handles, and caches endpoints and
//! catalog configurations in a shared `CacheStore`.

pub mod api;
pub mod auth;
pub mod catalog_client;
pub mod context;
pub mod layer_provider;
pub mod request;
pub mod resolver;
pub mod settings;
pub mod transport;
pub mod versioned_layer;

pub use auth::{StaticToken, TokenProvider};
pub use catalog_client::CatalogClient;
pub use context::RequestContext;
pub use layer_provider::{CatalogLayer, LayerDataProvider};
pub use request::{
    DataRequest, PartitionAddress, PartitionsMetadata, PartitionsQuery, PartitionsRequest,
    QuadKeyPartitionsRequest, MAX_QUAD_TREE_DEPTH,
};
pub use resolver::ServiceResolver;
pub use settings::ClientSettings;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
pub use versioned_layer::VersionedLayerClient;

pub use olp_common::{Hrn, OlpError, OlpResult, QuadKey, ServiceName};
