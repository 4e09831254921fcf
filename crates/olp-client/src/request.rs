//! Request types for partition data and partition metadata.

use olp_common::model::{Partitions, QuadTreeIndex};
use olp_common::{OlpError, OlpResult, QuadKey};

/// Deepest sub-tree the query service returns for one quad-tree request.
pub const MAX_QUAD_TREE_DEPTH: u32 = 4;

/// How a partition is addressed. Exactly one mode per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionAddress {
    /// Blob pointer, downloaded directly.
    DataHandle(String),
    /// Partition id, resolved to a data handle through the query service.
    PartitionId { id: String, version: Option<u64> },
    /// Tile, resolved through the quad-tree index.
    QuadKey {
        key: QuadKey,
        version: Option<u64>,
        depth: u32,
    },
}

/// Builder for a partition data request.
///
/// Several addressing fields may be set; `address` picks one of them with a
/// fixed precedence.
#[derive(Debug, Clone, Default)]
pub struct DataRequest {
    data_handle: Option<String>,
    partition_id: Option<String>,
    quad_key: Option<QuadKey>,
    version: Option<u64>,
    depth: Option<u32>,
    billing_tag: Option<String>,
}

impl DataRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_handle(mut self, data_handle: impl Into<String>) -> Self {
        self.data_handle = Some(data_handle.into());
        self
    }

    pub fn with_partition_id(mut self, partition_id: impl Into<String>) -> Self {
        self.partition_id = Some(partition_id.into());
        self
    }

    pub fn with_quad_key(mut self, quad_key: QuadKey) -> Self {
        self.quad_key = Some(quad_key);
        self
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn with_billing_tag(mut self, billing_tag: impl Into<String>) -> Self {
        self.billing_tag = Some(billing_tag.into());
        self
    }

    pub fn version(&self) -> Option<u64> {
        self.version
    }

    pub fn billing_tag(&self) -> Option<&str> {
        self.billing_tag.as_deref()
    }

    /// Select the addressing mode: data handle, then partition id, then quad
    /// key. Empty strings count as unset. Fails when nothing usable is set.
    pub fn address(&self) -> OlpResult<PartitionAddress> {
        if let Some(handle) = non_empty(&self.data_handle) {
            return Ok(PartitionAddress::DataHandle(handle.to_string()));
        }

        if let Some(id) = non_empty(&self.partition_id) {
            return Ok(PartitionAddress::PartitionId {
                id: id.to_string(),
                version: self.version,
            });
        }

        if let Some(key) = self.quad_key {
            return Ok(PartitionAddress::QuadKey {
                key,
                version: self.version,
                depth: self.depth.unwrap_or(0),
            });
        }

        Err(OlpError::InvalidRequest(
            "No data provided. Add dataHandle, partitionId or quadKey to the DataRequest".to_string(),
        ))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Spatial metadata request: a tile and the sub-tree depth below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuadKeyPartitionsRequest {
    pub quad_key: QuadKey,
    pub version: Option<u64>,
    pub depth: u32,
    pub billing_tag: Option<String>,
}

impl QuadKeyPartitionsRequest {
    pub fn new(quad_key: QuadKey) -> Self {
        Self {
            quad_key,
            version: None,
            depth: 0,
            billing_tag: None,
        }
    }

    pub fn with_version(mut self, version: Option<u64>) -> Self {
        self.version = version;
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_billing_tag(mut self, billing_tag: Option<String>) -> Self {
        self.billing_tag = billing_tag;
        self
    }

    pub(crate) fn validate(&self) -> OlpResult<()> {
        if self.depth > MAX_QUAD_TREE_DEPTH {
            return Err(OlpError::InvalidRequest(format!(
                "depth {} exceeds maximum {}",
                self.depth, MAX_QUAD_TREE_DEPTH
            )));
        }
        Ok(())
    }
}

/// Flat metadata request: selected ids, or the whole layer when no ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionsRequest {
    pub partition_ids: Option<Vec<String>>,
    pub version: Option<u64>,
    pub billing_tag: Option<String>,
}

impl PartitionsRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_partition_ids(mut self, partition_ids: Vec<String>) -> Self {
        self.partition_ids = Some(partition_ids);
        self
    }

    pub fn with_version(mut self, version: Option<u64>) -> Self {
        self.version = version;
        self
    }

    pub fn with_billing_tag(mut self, billing_tag: Option<String>) -> Self {
        self.billing_tag = billing_tag;
        self
    }

    /// Requested ids, `None` when absent or empty.
    pub fn ids(&self) -> Option<&[String]> {
        self.partition_ids
            .as_deref()
            .filter(|ids| !ids.is_empty())
    }
}

/// Either shape of a partitions metadata request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionsQuery {
    Spatial(QuadKeyPartitionsRequest),
    Flat(PartitionsRequest),
}

impl From<QuadKeyPartitionsRequest> for PartitionsQuery {
    fn from(request: QuadKeyPartitionsRequest) -> Self {
        PartitionsQuery::Spatial(request)
    }
}

impl From<PartitionsRequest> for PartitionsQuery {
    fn from(request: PartitionsRequest) -> Self {
        PartitionsQuery::Flat(request)
    }
}

/// Result of a partitions metadata request, matching the query shape.
#[derive(Debug, Clone, PartialEq)]
pub enum PartitionsMetadata {
    Index(QuadTreeIndex),
    Partitions(Partitions),
}

impl PartitionsMetadata {
    pub fn into_index(self) -> Option<QuadTreeIndex> {
        match self {
            PartitionsMetadata::Index(index) => Some(index),
            PartitionsMetadata::Partitions(_) => None,
        }
    }

    pub fn into_partitions(self) -> Option<Partitions> {
        match self {
            PartitionsMetadata::Partitions(partitions) => Some(partitions),
            PartitionsMetadata::Index(_) => None,
        }
    }
}
