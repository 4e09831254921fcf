//! Blob service: partition payloads.

use olp_common::OlpResult;

use crate::context::{billing_query, RequestContext};
use crate::transport::HttpResponse;

/// Start downloading a blob. The body is returned unread.
pub async fn get_blob(
    ctx: &RequestContext,
    layer_id: &str,
    data_handle: &str,
    billing_tag: Option<&str>,
) -> OlpResult<HttpResponse> {
    ctx.get(
        &["layers", layer_id, "data", data_handle],
        &billing_query(billing_tag),
    )
    .await
}
