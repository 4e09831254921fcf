//! Service discovery: resolve a logical service to a base URL.
//!
//! Resolution order:
//! 1. Endpoint cache (no network, no liveness check)
//! 2. API lookup service for the configured environment, resource-scoped
//!    when an HRN is given and platform-wide otherwise
//!
//! Successful lookups are written back to the cache. Nothing is retried.

use metrics::counter;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use olp_cache::{EndpointCache, EndpointCacheKey};
use olp_common::model::LookupResponse;
use olp_common::{Hrn, OlpError, OlpResult, ServiceName};

use crate::api::lookup;
use crate::context::RequestContext;
use crate::settings::ClientSettings;

/// Resolves service endpoints through the endpoint cache and lookup service.
#[derive(Clone)]
pub struct ServiceResolver {
    settings: ClientSettings,
    cache: EndpointCache,
}

impl ServiceResolver {
    pub fn new(settings: &ClientSettings) -> Self {
        Self {
            settings: settings.clone(),
            cache: EndpointCache::new(settings.cache.clone()),
        }
    }

    /// Resolve the base URL of `service`/`service_version`.
    #[instrument(skip(self, hrn, cancel), fields(service = %service, hrn = %hrn.map(ToString::to_string).unwrap_or_default()))]
    pub async fn resolve(
        &self,
        service: ServiceName,
        service_version: &str,
        hrn: Option<&Hrn>,
        cancel: Option<&CancellationToken>,
    ) -> OlpResult<String> {
        check_scope(service, hrn)?;

        let key = EndpointCacheKey::new(service, service_version, hrn);
        if let Some(base_url) = self.cache.get(&key).await {
            return Ok(base_url);
        }

        let lookup_url = self.settings.environment.lookup_url();
        let lookup_ctx = RequestContext::new(
            ServiceName::Lookup,
            lookup_url,
            &self.settings,
            cancel.cloned(),
        );
        debug!(lookup_url = %lookup_url, "Resolving endpoint through API lookup");
        counter!("olp_api_lookups_total").increment(1);

        let response = match hrn {
            Some(hrn) => lookup::resource_api(&lookup_ctx, hrn, service, service_version).await,
            None => lookup::platform_api(&lookup_ctx, service, service_version).await,
        }
        .map_err(|e| attribute_to(service, e))?;

        match response {
            LookupResponse::Endpoints(endpoints) => {
                let base_url = endpoints
                    .into_iter()
                    .next()
                    .map(|endpoint| endpoint.base_url)
                    .filter(|base_url| !base_url.is_empty())
                    .ok_or(OlpError::UnknownLookupError { service })?;

                self.cache.put(&key, &base_url).await;
                info!(base_url = %base_url, "Resolved service endpoint");
                Ok(base_url)
            }
            LookupResponse::NotFound(not_found) if not_found.status == 404 => {
                Err(OlpError::ServiceNotFound {
                    service,
                    title: not_found.title,
                })
            }
            LookupResponse::NotFound(_) => Err(OlpError::UnknownLookupError { service }),
        }
    }

    /// Resolve `service` at the configured API version and bind a request
    /// context to it.
    pub async fn request_context(
        &self,
        service: ServiceName,
        hrn: Option<&Hrn>,
        cancel: Option<&CancellationToken>,
    ) -> OlpResult<RequestContext> {
        let base_url = self
            .resolve(service, &self.settings.api_version, hrn, cancel)
            .await?;
        Ok(RequestContext::new(
            service,
            base_url,
            &self.settings,
            cancel.cloned(),
        ))
    }
}

/// Catalog services need an HRN and platform services must not get one, or
/// the endpoint would be cached under a key nobody reads.
fn check_scope(service: ServiceName, hrn: Option<&Hrn>) -> OlpResult<()> {
    if service == ServiceName::Lookup || hrn.is_some() == service.is_resource_scoped() {
        return Ok(());
    }

    let reason = if hrn.is_some() {
        "is platform-wide and takes no HRN"
    } else {
        "is registered per catalog and needs an HRN"
    };
    Err(OlpError::InvalidRequest(format!(
        "service {} {}",
        service, reason
    )))
}

/// Lookup failures are reported against the service being resolved.
fn attribute_to(service: ServiceName, err: OlpError) -> OlpError {
    match err {
        OlpError::Transport {
            status, message, ..
        } => OlpError::Transport {
            service,
            status,
            message: format!("API lookup failed: {}", message),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_transport_errors_name_the_resolved_service() {
        let err = attribute_to(
            ServiceName::Blob,
            OlpError::Transport {
                service: ServiceName::Lookup,
                status: Some(500),
                message: "Internal Server Error".to_string(),
            },
        );
        assert_eq!(
            err.to_string(),
            "blob service error: HTTP 500, API lookup failed: Internal Server Error"
        );
    }

    #[test]
    fn test_scope_check() {
        let hrn = Hrn::parse("hrn:here:data::olp-here:c").unwrap();
        assert!(check_scope(ServiceName::Query, Some(&hrn)).is_ok());
        assert!(check_scope(ServiceName::Config, None).is_ok());
        assert!(check_scope(ServiceName::Lookup, Some(&hrn)).is_ok());
        assert!(check_scope(ServiceName::Lookup, None).is_ok());
        assert!(matches!(
            check_scope(ServiceName::Config, Some(&hrn)),
            Err(OlpError::InvalidRequest(_))
        ));
        assert!(matches!(
            check_scope(ServiceName::Blob, None),
            Err(OlpError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_other_errors_pass_through() {
        let err = attribute_to(ServiceName::Blob, OlpError::Cancelled);
        assert!(matches!(err, OlpError::Cancelled));
    }
}
