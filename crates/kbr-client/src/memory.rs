use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use kbr_types::Resource;

use crate::error::{ClientError, ClientResult};
use crate::transport::ResourceClient;

type ServerDefaults<R> = Box<dyn Fn(&mut R) + Send + Sync>;

/// A [`ResourceClient`] backed by a map, for tests and dry runs.
///
/// An optional hook mutates every written object the way a real server
/// fills in defaults, so reconciliation against it sees realistic drift.
pub struct InMemoryClient<R: Resource> {
    objects: RwLock<HashMap<String, R>>,
    server_defaults: Option<ServerDefaults<R>>,
    fail_writes: AtomicBool,
    gets: AtomicUsize,
    writes: AtomicUsize,
    deletes: AtomicUsize,
}

impl<R: Resource> Default for InMemoryClient<R> {
    fn default() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            server_defaults: None,
            fail_writes: AtomicBool::new(false),
            gets: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }
}

impl<R: Resource> fmt::Debug for InMemoryClient<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryClient")
            .field("kind", &R::KIND)
            .field("len", &self.len())
            .finish()
    }
}

impl<R: Resource> InMemoryClient<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `f` to every object on write, like server-side defaulting.
    pub fn with_server_defaults(mut self, f: impl Fn(&mut R) + Send + Sync + 'static) -> Self {
        self.server_defaults = Some(Box::new(f));
        self
    }

    /// Store an object directly, bypassing hooks and counters.
    pub fn insert(&self, resource: R) {
        self.write_lock().insert(resource.id().to_string(), resource);
    }

    /// Snapshot of a stored object, bypassing counters.
    pub fn peek(&self, id: &str) -> Option<R> {
        self.read_lock().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read_lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make every subsequent write fail with 503.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, R>> {
        self.objects.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_lock(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, R>> {
        self.objects.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn status(&self, method: &str, id: &str, status: u16, body: &str) -> ClientError {
        ClientError::Status {
            method: method.into(),
            url: format!("memory://{}/{id}", R::KIND),
            status,
            body: body.into(),
        }
    }
}

#[async_trait]
impl<R: Resource> ResourceClient<R> for InMemoryClient<R> {
    async fn get(&self, id: &str) -> ClientResult<Option<R>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Ok(self.read_lock().get(id).cloned())
    }

    async fn create_or_update(&self, resource: &R) -> ClientResult<R> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        resource.validate()?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(self.status("PUT", resource.id(), 503, "unavailable"));
        }
        let mut stored = resource.clone();
        if let Some(defaults) = &self.server_defaults {
            defaults(&mut stored);
        }
        self.write_lock()
            .insert(stored.id().to_string(), stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: &str) -> ClientResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        match self.write_lock().remove(id) {
            Some(_) => Ok(()),
            None => Err(self.status("DELETE", id, 404, "not found")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbr_types::{KibanaSpace, LogstashPipeline};
    use serde_json::json;

    #[tokio::test]
    async fn write_then_read() {
        let client = InMemoryClient::<KibanaSpace>::new();
        assert!(client.get("ops").await.unwrap().is_none());

        let space = KibanaSpace::new("ops", "Ops");
        let stored = client.create_or_update(&space).await.unwrap();
        assert_eq!(stored, space);
        assert_eq!(client.get("ops").await.unwrap(), Some(space));
        assert_eq!(client.get_calls(), 2);
        assert_eq!(client.write_calls(), 1);
        assert_eq!(client.len(), 1);
    }

    #[tokio::test]
    async fn server_defaults_are_applied_on_write() {
        let client = InMemoryClient::<LogstashPipeline>::new().with_server_defaults(|p| {
            p.username = Some("elastic".into());
            p.settings.entry("queue.type".into()).or_insert(json!("memory"));
        });
        let stored = client
            .create_or_update(&LogstashPipeline::new("main", "input {}"))
            .await
            .unwrap();
        assert_eq!(stored.username.as_deref(), Some("elastic"));
        assert_eq!(stored.settings["queue.type"], json!("memory"));
        assert_eq!(client.peek("main"), Some(stored));
    }

    #[tokio::test]
    async fn failing_writes() {
        let client = InMemoryClient::<KibanaSpace>::new();
        client.set_fail_writes(true);
        let err = client
            .create_or_update(&KibanaSpace::new("ops", "Ops"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert!(client.is_empty());
    }

    #[tokio::test]
    async fn invalid_object_is_rejected() {
        let client = InMemoryClient::<KibanaSpace>::new();
        let err = client.create_or_update(&KibanaSpace::new("", "x")).await.unwrap_err();
        assert!(matches!(err, ClientError::Invalid(_)));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let client = InMemoryClient::<KibanaSpace>::new();
        client.insert(KibanaSpace::new("ops", "Ops"));
        client.delete("ops").await.unwrap();
        assert!(client.delete("ops").await.unwrap_err().is_not_found());
        assert_eq!(client.delete_calls(), 2);
    }
}
