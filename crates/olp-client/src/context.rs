//! A request context bound to one resolved service endpoint.

use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use olp_common::{OlpError, OlpResult, ServiceName};

use crate::auth::TokenProvider;
use crate::settings::ClientSettings;
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// Base URL, credentials, transport and cancellation for calls to one service.
#[derive(Clone)]
pub struct RequestContext {
    service: ServiceName,
    base_url: String,
    transport: Arc<dyn Transport>,
    token_provider: Arc<dyn TokenProvider>,
    cancel: Option<CancellationToken>,
}

impl RequestContext {
    pub fn new(
        service: ServiceName,
        base_url: impl Into<String>,
        settings: &ClientSettings,
        cancel: Option<CancellationToken>,
    ) -> Self {
        Self {
            service,
            base_url: base_url.into(),
            transport: Arc::clone(&settings.transport),
            token_provider: Arc::clone(&settings.token_provider),
            cancel,
        }
    }

    pub fn service(&self) -> ServiceName {
        self.service
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build `{base_url}/{segments...}?{query}`. Segments are percent-encoded.
    pub fn url(&self, segments: &[&str], query: &[(&str, String)]) -> OlpResult<String> {
        let mut url = Url::parse(&self.base_url).map_err(|e| OlpError::Transport {
            service: self.service,
            status: None,
            message: format!("invalid base URL '{}': {}", self.base_url, e),
        })?;

        {
            let mut path = url.path_segments_mut().map_err(|_| OlpError::Transport {
                service: self.service,
                status: None,
                message: format!("base URL '{}' cannot carry a path", self.base_url),
            })?;
            path.pop_if_empty().extend(segments);
        }

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }

        Ok(url.into())
    }

    /// Race a future against the cancellation token, if any.
    pub async fn cancellable<T, F>(&self, future: F) -> OlpResult<T>
    where
        F: Future<Output = OlpResult<T>>,
    {
        match &self.cancel {
            Some(cancel) => {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(OlpError::Cancelled),
                    result = future => result,
                }
            }
            None => future.await,
        }
    }

    /// Send a GET and return the response whatever its status.
    pub async fn get_raw(&self, segments: &[&str], query: &[(&str, String)]) -> OlpResult<HttpResponse> {
        let url = self.url(segments, query)?;
        self.send(HttpRequest::get(url)).await
    }

    /// Send a request with auth attached. Only transport failures are errors.
    ///
    /// The token fetch and the transport call both run under cancellation.
    pub async fn send(&self, mut request: HttpRequest) -> OlpResult<HttpResponse> {
        let service = self.service;
        let transport = Arc::clone(&self.transport);
        let token_provider = Arc::clone(&self.token_provider);
        self.cancellable(async move {
            let token = token_provider.token().await?;
            if !token.is_empty() {
                request = request.header("Authorization", format!("Bearer {}", token));
            }

            debug!(service = %service, url = %request.url, "Sending request");

            transport
                .send(request)
                .await
                .map_err(|e| OlpError::Transport {
                    service,
                    status: None,
                    message: e.to_string(),
                })
        })
        .await
    }

    /// Send a GET and fail on any non-2xx status.
    pub async fn get(&self, segments: &[&str], query: &[(&str, String)]) -> OlpResult<HttpResponse> {
        let response = self.get_raw(segments, query).await?;
        self.error_for_status(response).await
    }

    /// Send a GET and decode a JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> OlpResult<T> {
        let response = self.get(segments, query).await?;
        let body = self.read_body(response).await?;
        serde_json::from_slice(&body).map_err(|e| OlpError::InvalidResponse {
            service: self.service,
            message: e.to_string(),
        })
    }

    /// Read a response body, honouring cancellation.
    pub async fn read_body(&self, response: HttpResponse) -> OlpResult<bytes::Bytes> {
        let service = self.service;
        self.cancellable(async move {
            response.bytes().await.map_err(|e| OlpError::Transport {
                service,
                status: None,
                message: e.to_string(),
            })
        })
        .await
    }

    /// Pass 2xx responses through; turn anything else into a transport error
    /// carrying the status and its reason text.
    pub async fn error_for_status(&self, response: HttpResponse) -> OlpResult<HttpResponse> {
        if response.is_success() {
            return Ok(response);
        }

        let status = response.status;
        let mut message = response.status_text.clone();
        if message.is_empty() {
            let body = self.read_body(response).await.unwrap_or_default();
            message = String::from_utf8_lossy(&body).chars().take(200).collect();
        }

        Err(OlpError::Transport {
            service: self.service,
            status: Some(status),
            message,
        })
    }
}

/// Optional billing tag as a query pair.
pub(crate) fn billing_query(billing_tag: Option<&str>) -> Vec<(&'static str, String)> {
    billing_tag
        .filter(|tag| !tag.is_empty())
        .map(|tag| vec![("billingTag", tag.to_string())])
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use olp_cache::NoopCache;
    use olp_common::Environment;
    use std::time::Duration;

    use crate::transport::TransportError;

    struct SlowTransport;

    #[async_trait]
    impl Transport for SlowTransport {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(HttpResponse::from_bytes(200, "late"))
        }
    }

    fn settings() -> ClientSettings {
        ClientSettings::new(
            Environment::Here,
            Arc::new(SlowTransport),
            Arc::new(NoopCache),
        )
    }

    #[test]
    fn test_url_building() {
        let ctx = RequestContext::new(
            ServiceName::Query,
            "https://query.example.com/query/v1/",
            &settings(),
            None,
        );
        let url = ctx
            .url(
                &["layers", "roads", "partitions"],
                &[("partition", "a".to_string()), ("partition", "b c".to_string())],
            )
            .unwrap();
        assert_eq!(
            url,
            "https://query.example.com/query/v1/layers/roads/partitions?partition=a&partition=b+c"
        );
    }

    #[test]
    fn test_url_keeps_hrn_colons() {
        let ctx = RequestContext::new(ServiceName::Config, "https://config.example.com", &settings(), None);
        let url = ctx
            .url(&["catalogs", "hrn:here:data::olp-here:rib-2"], &[])
            .unwrap();
        assert_eq!(url, "https://config.example.com/catalogs/hrn:here:data::olp-here:rib-2");
    }

    #[test]
    fn test_invalid_base_url() {
        let ctx = RequestContext::new(ServiceName::Blob, "not a url", &settings(), None);
        assert!(matches!(
            ctx.url(&["x"], &[]),
            Err(OlpError::Transport { service: ServiceName::Blob, .. })
        ));
    }

    #[tokio::test]
    async fn test_cancel_aborts_in_flight_request() {
        let cancel = CancellationToken::new();
        let ctx = RequestContext::new(
            ServiceName::Blob,
            "https://blob.example.com",
            &settings(),
            Some(cancel.clone()),
        );

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });

        let result = ctx.get(&["layers", "l", "data", "h"], &[]).await;
        assert!(matches!(result, Err(OlpError::Cancelled)));
        canceller.await.unwrap();
    }

    struct SlowToken;

    #[async_trait]
    impl TokenProvider for SlowToken {
        async fn token(&self) -> OlpResult<String> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("late".to_string())
        }
    }

    #[tokio::test]
    async fn test_cancel_aborts_slow_token_fetch() {
        let cancel = CancellationToken::new();
        let settings = settings().with_token_provider(Arc::new(SlowToken));
        let ctx = RequestContext::new(
            ServiceName::Metadata,
            "https://metadata.example.com",
            &settings,
            Some(cancel.clone()),
        );

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });

        let result = tokio::time::timeout(Duration::from_secs(5), ctx.get(&["versions", "latest"], &[]))
            .await
            .expect("cancellation should end the token fetch");
        assert!(matches!(result, Err(OlpError::Cancelled)));
        canceller.await.unwrap();
    }

    #[test]
    fn test_billing_query() {
        assert!(billing_query(None).is_empty());
        assert!(billing_query(Some("")).is_empty());
        assert_eq!(billing_query(Some("team-a")), vec![("billingTag", "team-a".to_string())]);
    }
}
