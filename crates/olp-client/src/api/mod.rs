//! Typed calls against the platform's REST services.
//!
//! Each function takes a `RequestContext` already bound to the service's
//! resolved base URL.

pub mod blob;
pub mod config;
pub mod lookup;
pub mod metadata;
pub mod query;
