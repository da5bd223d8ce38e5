//! Kibana API access for the reconciler.
//!
//! Reads and writes user spaces, roles, and Logstash pipelines over HTTP.
//! The [`ResourceClient`] trait is the seam the reconciler depends on; an
//! in-memory implementation stands in for a live server in tests.
//!
//! # Key Types
//!
//! - [`KibanaClient`] -- HTTP client for one Kibana instance
//! - [`KibanaConfig`] -- Address, credentials, and timeouts
//! - [`ResourceClient`] -- get / create-or-update / delete for one kind
//! - [`InMemoryClient`] -- Map-backed client with server-default hooks

pub mod config;
pub mod error;
pub mod kibana;
pub mod memory;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use config::KibanaConfig;
pub use error::{ClientError, ClientResult};
pub use kibana::KibanaClient;
pub use memory::InMemoryClient;
pub use transport::ResourceClient;
