use thiserror::Error;

/// Errors produced by resource type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("{kind} identifier must not be empty")]
    EmptyIdentifier { kind: &'static str },

    #[error("unknown resource kind: {0}")]
    UnknownKind(String),

    #[error("invalid {kind} field `{field}`: {reason}")]
    InvalidField {
        kind: &'static str,
        field: &'static str,
        reason: String,
    },
}

pub type TypeResult<T> = Result<T, TypeError>;
