//! Scripted in-memory transport.
//!
//! Routes match on a URL substring. Later routes take precedence, so a test
//! can override a default route by adding a more specific one.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Mutex;
use std::time::Duration;

use olp_client::transport::{HttpRequest, HttpResponse, Transport, TransportError};

#[derive(Debug, Clone)]
struct Route {
    fragment: String,
    status: u16,
    content_type: &'static str,
    body: Bytes,
}

/// A transport answering from a fixed route table and recording requests.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<HttpRequest>>,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long before answering each request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer URLs containing `fragment` with a raw body.
    pub fn respond(&self, fragment: impl Into<String>, status: u16, body: impl Into<Bytes>) {
        self.push(Route {
            fragment: fragment.into(),
            status,
            content_type: "application/octet-stream",
            body: body.into(),
        });
    }

    /// Answer URLs containing `fragment` with a JSON document.
    pub fn respond_json(&self, fragment: impl Into<String>, status: u16, body: serde_json::Value) {
        self.push(Route {
            fragment: fragment.into(),
            status,
            content_type: "application/json",
            body: Bytes::from(body.to_string()),
        });
    }

    fn push(&self, route: Route) {
        self.routes
            .lock()
            .expect("route table poisoned")
            .push(route);
    }

    /// URLs requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.requests
            .lock()
            .expect("request log poisoned")
            .iter()
            .map(|request| request.url.clone())
            .collect()
    }

    /// Requests made so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }

    /// Number of requested URLs containing `fragment`.
    pub fn count_matching(&self, fragment: &str) -> usize {
        self.calls()
            .iter()
            .filter(|url| url.contains(fragment))
            .count()
    }

    fn route_for(&self, url: &str) -> Option<Route> {
        self.routes
            .lock()
            .expect("route table poisoned")
            .iter()
            .rev()
            .find(|route| url.contains(&route.fragment))
            .cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.clone();
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let route = self
            .route_for(&url)
            .ok_or_else(|| TransportError::Request(format!("no mock route for {}", url)))?;

        let mut response = HttpResponse::from_bytes(route.status, route.body);
        response.status_text = reason_phrase(route.status).to_string();
        response
            .headers
            .insert("content-type".to_string(), route.content_type.to_string());
        Ok(response)
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_latest_route_wins() {
        let transport = MockTransport::new();
        transport.respond("/data/", 200, "old");
        transport.respond("/data/H1", 200, "new");

        let response =
            assert_ok!(transport.send(HttpRequest::get("https://blob.mock/layers/l/data/H1")).await);
        assert_eq!(response.status_text, "OK");
        assert_eq!(assert_ok!(response.bytes().await), Bytes::from("new"));
        assert_eq!(transport.count_matching("/data/H1"), 1);
    }

    #[tokio::test]
    async fn test_unmatched_url_is_a_transport_error() {
        let transport = MockTransport::new();
        let err = assert_err!(transport.send(HttpRequest::get("https://nowhere.mock/")).await);
        assert!(matches!(err, TransportError::Request(_)));
        assert_eq!(transport.calls(), vec!["https://nowhere.mock/".to_string()]);
    }
}
