//! Common types and utilities shared across the OLP catalog read crates.

pub mod config;
pub mod error;
pub mod hrn;
pub mod model;
pub mod quadkey;
pub mod service;

pub use config::{ClientConfig, Environment};
pub use error::{OlpError, OlpResult};
pub use hrn::{Hrn, HrnParseError};
pub use quadkey::QuadKey;
pub use service::ServiceName;
