//! Settings shared by every client: environment, auth, transport and cache.

use std::sync::Arc;
use std::time::Duration;

use olp_cache::{CacheStore, MemoryCache};
use olp_common::{ClientConfig, Environment, OlpError, OlpResult};

use crate::auth::{StaticToken, TokenProvider};
use crate::transport::{ReqwestTransport, Transport};

/// Read-only settings handed to resolvers and clients.
///
/// The cache store is injected rather than global: every client built from
/// the same settings shares it, and tests substitute their own.
#[derive(Clone)]
pub struct ClientSettings {
    pub environment: Environment,
    pub api_version: String,
    pub token_provider: Arc<dyn TokenProvider>,
    pub transport: Arc<dyn Transport>,
    pub cache: Arc<dyn CacheStore>,
}

impl ClientSettings {
    /// Settings with an anonymous token and the `v1` service APIs.
    pub fn new(
        environment: Environment,
        transport: Arc<dyn Transport>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            environment,
            api_version: "v1".to_string(),
            token_provider: Arc::new(StaticToken::default()),
            transport,
            cache,
        }
    }

    /// Build settings from configuration with a reqwest transport and a
    /// memory cache sized by the config.
    pub fn from_config(config: &ClientConfig) -> OlpResult<Self> {
        config.validate().map_err(OlpError::Config)?;

        let transport = ReqwestTransport::new(Duration::from_secs(config.request_timeout_secs))?;
        let ttl = (config.cache_ttl_secs > 0).then(|| Duration::from_secs(config.cache_ttl_secs));
        let cache = MemoryCache::new(config.cache_size_mb, ttl);

        Ok(Self {
            environment: config.environment.clone(),
            api_version: config.api_version.clone(),
            token_provider: Arc::new(StaticToken::new(config.access_token.clone())),
            transport: Arc::new(transport),
            cache: Arc::new(cache),
        })
    }

    pub fn with_token_provider(mut self, token_provider: Arc<dyn TokenProvider>) -> Self {
        self.token_provider = token_provider;
        self
    }

    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.with_token_provider(Arc::new(StaticToken::new(token)))
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }
}

impl std::fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSettings")
            .field("environment", &self.environment)
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}
