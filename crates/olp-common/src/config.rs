//! Client configuration: target environment, credentials and cache sizing.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Platform environment, which decides the API lookup endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Here,
    HereDev,
    HereCn,
    HereCnDev,
    /// A lookup base URL used verbatim (local or private deployments)
    Custom(String),
}

impl Environment {
    /// Base URL of the API lookup service for this environment.
    pub fn lookup_url(&self) -> &str {
        match self {
            Environment::Here => "https://api-lookup.data.api.platform.here.com/lookup/v1",
            Environment::HereDev => "https://api-lookup.data.api.platform.in.here.com/lookup/v1",
            Environment::HereCn => "https://api-lookup.data.api.platform.hereolp.cn/lookup/v1",
            Environment::HereCnDev => {
                "https://api-lookup.data.api.platform.in.hereolp.cn/lookup/v1"
            }
            Environment::Custom(url) => url.trim_end_matches('/'),
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            return Ok(Environment::Custom(trimmed.to_string()));
        }
        match trimmed.to_lowercase().as_str() {
            "here" => Ok(Environment::Here),
            "here-dev" => Ok(Environment::HereDev),
            "here-cn" => Ok(Environment::HereCn),
            "here-cn-dev" => Ok(Environment::HereCnDev),
            _ => Err(format!(
                "unknown environment '{}' (expected here, here-dev, here-cn, here-cn-dev or a URL)",
                s
            )),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Here => f.write_str("here"),
            Environment::HereDev => f.write_str("here-dev"),
            Environment::HereCn => f.write_str("here-cn"),
            Environment::HereCnDev => f.write_str("here-cn-dev"),
            Environment::Custom(url) => f.write_str(url),
        }
    }
}

impl Serialize for Environment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Environment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Configuration for building a catalog read client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Platform environment or custom lookup URL.
    pub environment: Environment,

    /// Bearer token sent with every request (empty means anonymous).
    pub access_token: String,

    /// Memory budget for the in-process cache in megabytes.
    pub cache_size_mb: usize,

    /// Expiry for cached endpoints and catalog documents, 0 disables expiry.
    pub cache_ttl_secs: u64,

    /// HTTP request timeout.
    pub request_timeout_secs: u64,

    /// Service API version requested from the lookup service.
    pub api_version: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Here,
            access_token: String::new(),
            cache_size_mb: 64,
            cache_ttl_secs: 3600,
            request_timeout_secs: 60,
            api_version: "v1".to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("OLP_ENVIRONMENT") {
            match val.parse() {
                Ok(environment) => config.environment = environment,
                Err(e) => tracing::warn!(error = %e, "Ignoring OLP_ENVIRONMENT"),
            }
        }

        if let Ok(val) = std::env::var("OLP_ACCESS_TOKEN") {
            config.access_token = val;
        }

        if let Ok(val) = std::env::var("OLP_CACHE_SIZE_MB") {
            if let Ok(size) = val.parse() {
                config.cache_size_mb = size;
            }
        }

        if let Ok(val) = std::env::var("OLP_CACHE_TTL_SECS") {
            if let Ok(ttl) = val.parse() {
                config.cache_ttl_secs = ttl;
            }
        }

        if let Ok(val) = std::env::var("OLP_REQUEST_TIMEOUT_SECS") {
            if let Ok(timeout) = val.parse() {
                config.request_timeout_secs = timeout;
            }
        }

        if let Ok(val) = std::env::var("OLP_API_VERSION") {
            config.api_version = val;
        }

        config
    }

    /// Load configuration from a YAML file. Missing fields take defaults.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {:?}", path))?;

        let config: ClientConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse client config: {:?}", path))?;

        tracing::info!(
            environment = %config.environment,
            path = ?path,
            "Loaded client configuration"
        );

        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_size_mb == 0 {
            return Err("cache_size_mb must be > 0".to_string());
        }

        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be > 0".to_string());
        }

        if self.api_version.trim().is_empty() {
            return Err("api_version must not be empty".to_string());
        }

        Ok(())
    }
}
