use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("patch error: {0}")]
    Patch(#[from] kbr_patch::PatchError),

    #[error("client error: {0}")]
    Client(#[from] kbr_client::ClientError),

    #[error("invalid resource: {0}")]
    Invalid(#[from] kbr_types::TypeError),
}

impl HandlerError {
    /// HTTP status carried by a client error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Client(e) => e.status(),
            _ => None,
        }
    }
}

pub type HandlerResult<T> = Result<T, HandlerError>;
