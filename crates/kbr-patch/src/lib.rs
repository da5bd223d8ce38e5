//! Three-way merge-patch engine for the Kibana reconciler.
//!
//! Given the live (*actual*), desired (*expected*) and last-applied
//! (*original*) versions of a resource, decides whether an update is needed
//! and produces the object to submit. The engine is schema-agnostic: it works
//! on the JSON tree of any `serde` type, performs no I/O, and is safe to call
//! concurrently.
//!
//! # Key Types
//!
//! - [`PatchMaker`] / [`PatchOptions`] -- The three-way engine
//! - [`PatchResult`] -- Patch bytes, canonical forms, and the resolved object
//! - [`Delta`] / [`FieldOp`] / [`FieldPath`] -- Field-level operations
//! - [`Fingerprint`] -- BLAKE3 digest of a canonical form

pub mod canonical;
pub mod delta;
pub mod error;
pub mod fingerprint;
pub mod maker;
pub mod render;
pub mod result;

pub use canonical::{
    canonical_bytes, canonicalize, canonicalize_patch, normalize, to_canonical_value, to_json_tree,
};
pub use delta::{Delta, FieldOp, FieldPath};
pub use error::{EngineResult, PatchError};
pub use fingerprint::Fingerprint;
pub use maker::{calculate, PatchMaker, PatchOptions};
pub use result::PatchResult;
