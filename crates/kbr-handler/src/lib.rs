//! Kibana resource handler and reconciler.
//!
//! Wires the three-way patch engine to the Kibana API: per-kind diff entry
//! points, remote operations for spaces, roles and Logstash pipelines, and a
//! reconciler that submits only what actually changed.
//!
//! # Key Types
//!
//! - [`KibanaHandler`] -- Per-kind get / update / delete / diff operations
//! - [`Reconciler`] -- Fetch, diff, and submit under a per-resource lock
//! - [`KeyedLocks`] -- Async mutexes keyed by `kind/id`
//! - [`Outcome`] / [`Reconciliation`] -- What a reconciliation did

pub mod adapter;
pub mod error;
pub mod handler;
pub mod reconcile;

pub use adapter::{diff, diff_with};
pub use error::{HandlerError, HandlerResult};
pub use handler::KibanaHandler;
pub use reconcile::{KeyedLocks, Outcome, Reconciler, Reconciliation};

// Re-export key types
pub use kbr_client::{InMemoryClient, KibanaClient, KibanaConfig, ResourceClient};
pub use kbr_patch::{PatchMaker, PatchOptions, PatchResult};
pub use kbr_types::{KibanaRole, KibanaSpace, LogstashPipeline, Resource, ResourceKind};
