//! Config service: catalog configuration documents.

use olp_common::model::Catalog;
use olp_common::{Hrn, OlpResult};

use crate::context::{billing_query, RequestContext};

pub async fn get_catalog(
    ctx: &RequestContext,
    hrn: &Hrn,
    billing_tag: Option<&str>,
) -> OlpResult<Catalog> {
    let hrn = hrn.to_string();
    ctx.get_json(&["catalogs", hrn.as_str()], &billing_query(billing_tag))
        .await
}
