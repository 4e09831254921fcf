//! HERE Resource Names (HRNs), the canonical identity of a catalog.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A parsed HRN of the form `hrn:<partition>:<service>:<region>:<account>:<resource>`.
///
/// Region and account may be empty (`hrn:here:data::olp-here:rib-2`); the
/// partition, service and resource may not. Two HRNs are equal when their
/// canonical strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hrn {
    pub partition: String,
    pub service: String,
    pub region: String,
    pub account: String,
    pub resource: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HrnParseError {
    #[error("'{0}' does not start with 'hrn:'")]
    MissingPrefix(String),

    #[error("'{0}' must have 6 ':'-separated sections")]
    WrongSectionCount(String),

    #[error("'{input}' has an empty {section} section")]
    EmptySection { input: String, section: &'static str },
}

impl Hrn {
    /// Parse and validate an HRN string.
    pub fn parse(s: &str) -> Result<Self, HrnParseError> {
        let trimmed = s.trim();
        if !trimmed.starts_with("hrn:") {
            return Err(HrnParseError::MissingPrefix(s.to_string()));
        }

        // The resource section may itself contain ':' (e.g. schema HRNs).
        let parts: Vec<&str> = trimmed.splitn(6, ':').collect();
        if parts.len() != 6 {
            return Err(HrnParseError::WrongSectionCount(s.to_string()));
        }

        let required = [(1, "partition"), (2, "service"), (5, "resource")];
        for (index, section) in required {
            if parts[index].is_empty() {
                return Err(HrnParseError::EmptySection {
                    input: s.to_string(),
                    section,
                });
            }
        }

        Ok(Self {
            partition: parts[1].to_string(),
            service: parts[2].to_string(),
            region: parts[3].to_string(),
            account: parts[4].to_string(),
            resource: parts[5].to_string(),
        })
    }
}

impl fmt::Display for Hrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hrn:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account, self.resource
        )
    }
}

impl FromStr for Hrn {
    type Err = HrnParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hrn::parse(s)
    }
}

impl Serialize for Hrn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hrn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Hrn::parse(&raw).map_err(serde::de::Error::custom)
    }
}
