//! Error types for the patch crate.

/// Errors that can occur while computing a patch.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// A value could not be turned into a JSON tree (e.g. a map with
    /// non-string keys, or a failing `Serialize` impl).
    #[error("failed to encode {what} as canonical JSON: {reason}")]
    Encode { what: &'static str, reason: String },

    /// The patched tree no longer fits the caller's declared shape.
    #[error("failed to decode patched object: {0}")]
    Decode(String),
}

pub type EngineResult<T> = Result<T, PatchError>;
