//! Error types for the catalog read pipeline.

use thiserror::Error;

use crate::ServiceName;

/// Result type alias using OlpError.
pub type OlpResult<T> = Result<T, OlpError>;

/// Primary error type for resolution and retrieval.
#[derive(Debug, Error)]
pub enum OlpError {
    // === Request Errors ===
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid HRN: {0}")]
    InvalidHrn(String),

    // === Lookup Errors ===
    #[error("Getting API {service} error: {title}")]
    ServiceNotFound { service: ServiceName, title: String },

    #[error("Getting API {service} unknown error")]
    UnknownLookupError { service: ServiceName },

    // === Catalog Errors ===
    #[error("No partition dataHandle for partition {partition}. HRN: {hrn}")]
    PartitionNotFound { partition: String, hrn: String },

    #[error("There is no layer {layer} in this catalog. HRN: {hrn}")]
    LayerNotFound { layer: String, hrn: String },

    // === Transport Errors ===
    #[error("{service} service error: {}", describe_status(.status, .message))]
    Transport {
        service: ServiceName,
        status: Option<u16>,
        message: String,
    },

    #[error("{service} service returned an unreadable response: {message}")]
    InvalidResponse { service: ServiceName, message: String },

    #[error("Operation cancelled")]
    Cancelled,

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    Config(String),
}

fn describe_status(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("HTTP {}, {}", code, message),
        None => message.to_string(),
    }
}

impl OlpError {
    /// The remote service this error is attributed to, if any.
    pub fn service(&self) -> Option<ServiceName> {
        match self {
            OlpError::ServiceNotFound { service, .. }
            | OlpError::UnknownLookupError { service }
            | OlpError::Transport { service, .. }
            | OlpError::InvalidResponse { service, .. } => Some(*service),
            _ => None,
        }
    }

    /// Whether the error means the addressed thing does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            OlpError::ServiceNotFound { .. }
            | OlpError::PartitionNotFound { .. }
            | OlpError::LayerNotFound { .. } => true,
            OlpError::Transport { status, .. } => *status == Some(404),
            _ => false,
        }
    }
}

impl From<crate::HrnParseError> for OlpError {
    fn from(err: crate::HrnParseError) -> Self {
        OlpError::InvalidHrn(err.to_string())
    }
}
