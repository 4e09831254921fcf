//! Logical service families resolved through the API lookup service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A remote service family, named the way the lookup API names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceName {
    /// API lookup (discovery) service
    Lookup,
    /// Catalog and layer version metadata
    Metadata,
    /// Partition queries by id and quad key
    Query,
    /// Partition data blobs
    Blob,
    /// Catalog configuration documents
    Config,
}

impl ServiceName {
    pub const ALL: [ServiceName; 5] = [
        ServiceName::Lookup,
        ServiceName::Metadata,
        ServiceName::Query,
        ServiceName::Blob,
        ServiceName::Config,
    ];

    /// Name used in lookup URLs and cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceName::Lookup => "lookup",
            ServiceName::Metadata => "metadata",
            ServiceName::Query => "query",
            ServiceName::Blob => "blob",
            ServiceName::Config => "config",
        }
    }

    /// Whether the service is registered per catalog rather than platform-wide.
    ///
    /// Resource-scoped services must be looked up with the catalog HRN;
    /// platform services must be looked up without one.
    pub fn is_resource_scoped(&self) -> bool {
        matches!(
            self,
            ServiceName::Metadata | ServiceName::Query | ServiceName::Blob
        )
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceName::ALL
            .into_iter()
            .find(|service| service.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown service '{}'", s))
    }
}
