//! Resource schemas for the Kibana reconciler (`kbr`).
//!
//! Every resource kind managed through the Kibana API is described here as a
//! plain `serde` record. The diff engine never looks at these shapes; it only
//! sees their JSON trees. Every other `kbr` crate depends on `kbr-types`.
//!
//! # Key Types
//!
//! - [`Resource`] -- Trait tying a typed record to its [`ResourceKind`] and identifier
//! - [`KibanaSpace`] -- A Kibana user space
//! - [`KibanaRole`] -- A Kibana role with Elasticsearch and Kibana privileges
//! - [`LogstashPipeline`] -- A centrally managed Logstash pipeline
//! - [`CopySavedObjectsRequest`] -- Parameters for copying saved objects across spaces

pub mod error;
pub mod kind;
pub mod pipeline;
pub mod resource;
pub mod role;
pub mod space;

pub use error::{TypeError, TypeResult};
pub use kind::ResourceKind;
pub use pipeline::LogstashPipeline;
pub use resource::{Extra, Resource};
pub use role::{
    KibanaRole, KibanaRoleElasticsearch, KibanaRoleFieldSecurity, KibanaRoleIndex,
    KibanaRolePrivilege, KibanaRoleTransientMetadata,
};
pub use space::{CopySavedObjectsRequest, KibanaSpace, SavedObjectRef};
