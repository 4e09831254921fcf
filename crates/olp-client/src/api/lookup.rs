//! API lookup service: maps a service name and version to base URLs.

use serde_json::Value;

use olp_common::model::{ApiNotFoundError, LookupResponse};
use olp_common::{Hrn, OlpError, OlpResult, ServiceName};

use crate::context::RequestContext;

/// Look up a service registered for a catalog.
pub async fn resource_api(
    ctx: &RequestContext,
    hrn: &Hrn,
    api: ServiceName,
    version: &str,
) -> OlpResult<LookupResponse> {
    let hrn = hrn.to_string();
    fetch(ctx, &["resources", hrn.as_str(), "apis", api.as_str(), version], api).await
}

/// Look up a platform-wide service.
pub async fn platform_api(
    ctx: &RequestContext,
    api: ServiceName,
    version: &str,
) -> OlpResult<LookupResponse> {
    fetch(ctx, &["platform", "apis", api.as_str(), version], api).await
}

/// The lookup service answers unknown APIs with a 404 whose body is a
/// not-found document, so that status is decoded rather than failed.
async fn fetch(ctx: &RequestContext, segments: &[&str], api: ServiceName) -> OlpResult<LookupResponse> {
    let response = ctx.get_raw(segments, &[]).await?;
    if !response.is_success() && response.status != 404 {
        ctx.error_for_status(response).await?;
        return Err(OlpError::UnknownLookupError { service: api });
    }

    let status = response.status;
    let status_text = response.status_text.clone();
    let body = ctx.read_body(response).await?;
    if status == 404 {
        return Ok(LookupResponse::NotFound(not_found_document(&body, &status_text)));
    }

    serde_json::from_slice(&body).map_err(|_| OlpError::UnknownLookupError { service: api })
}

/// Not-found document for an HTTP 404, whatever the body holds. The title
/// falls back to the status text.
fn not_found_document(body: &[u8], status_text: &str) -> ApiNotFoundError {
    let document: Option<Value> = serde_json::from_slice(body).ok();
    let field = |name: &str| document.as_ref().and_then(|doc| doc.get(name)).cloned();

    let title = field("title")
        .and_then(|title| title.as_str().map(str::to_string))
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| status_text.to_string());

    ApiNotFoundError {
        status: 404,
        title,
        detail: field("detail"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_without_status_field_keeps_title() {
        let doc = not_found_document(
            br#"{"title":"Service not registered","detail":[]}"#,
            "Not Found",
        );
        assert_eq!(doc.status, 404);
        assert_eq!(doc.title, "Service not registered");
        assert_eq!(doc.detail, Some(serde_json::json!([])));
    }

    #[test]
    fn test_not_found_with_unreadable_body_uses_status_text() {
        let doc = not_found_document(b"<html>gone</html>", "Not Found");
        assert_eq!(doc.title, "Not Found");
        assert!(doc.detail.is_none());
    }
}
