use async_trait::async_trait;
use kbr_types::Resource;

use crate::error::ClientResult;

/// Remote access to one kind of resource.
///
/// This is all the reconciler needs from the server: read the live state,
/// submit a resolved object, and delete. Errors are returned as they came
/// back from the transport; implementations never retry.
#[async_trait]
pub trait ResourceClient<R: Resource>: Send + Sync {
    /// Fetch the live object. `Ok(None)` when it does not exist.
    async fn get(&self, id: &str) -> ClientResult<Option<R>>;

    /// Create the object if missing, otherwise replace it. Returns the
    /// object as stored by the server.
    async fn create_or_update(&self, resource: &R) -> ClientResult<R>;

    /// Delete the object.
    async fn delete(&self, id: &str) -> ClientResult<()>;
}
