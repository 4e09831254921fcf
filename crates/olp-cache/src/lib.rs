//! Cache abstractions for the catalog read client.
//!
//! Provides:
//! - `CacheStore`, the narrow get/set capability every cache is built on
//! - `MemoryCache`, an in-process LRU store with memory budget and TTL
//! - `NoopCache`, a store that never retains anything
//! - `EndpointCache` and `CatalogConfigCache`, typed facades keyed the way
//!   the resolvers need them

pub mod catalog_config;
pub mod endpoint;
pub mod memory;
pub mod store;

pub use catalog_config::{CatalogConfigCache, CatalogConfigCacheKey};
pub use endpoint::{EndpointCache, EndpointCacheKey};
pub use memory::{MemoryCache, MemoryCacheStats};
pub use store::{CacheStore, NoopCache};
