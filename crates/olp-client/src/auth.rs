//! Access token providers.

use async_trait::async_trait;

use olp_common::OlpResult;

/// Supplies the bearer token attached to every request.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Current token; an empty string means the request is sent anonymously.
    async fn token(&self) -> OlpResult<String>;
}

/// A fixed token.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(pub String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> OlpResult<String> {
        Ok(self.0.clone())
    }
}
