//! Fetch / diff / submit loop for one resource.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use kbr_client::ResourceClient;
use kbr_patch::{PatchMaker, PatchResult};
use kbr_types::Resource;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info};

use crate::adapter;
use crate::error::HandlerResult;

/// What a reconciliation did upstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    Unchanged,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
        })
    }
}

/// Result of reconciling one resource.
#[derive(Clone, Debug)]
pub struct Reconciliation<R> {
    pub outcome: Outcome,
    pub result: PatchResult<R>,
    /// The object as returned by the server after submission. `None` when
    /// nothing was submitted.
    pub stored: Option<R>,
}

/// Async mutexes keyed by resource, created on first use.
///
/// Entries nobody holds or waits on are pruned on the next `lock`, so the
/// map only tracks keys that are in use.
#[derive(Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(key.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for KeyedLocks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedLocks").field("keys", &self.len()).finish()
    }
}

/// Drives resources towards their declared state.
///
/// Reconciliations of the same `kind/id` are serialized; different
/// resources proceed concurrently. The client is passed per call.
#[derive(Debug, Default)]
pub struct Reconciler {
    maker: PatchMaker,
    locks: KeyedLocks,
}

impl Reconciler {
    pub fn new(maker: PatchMaker) -> Self {
        Self {
            maker,
            locks: KeyedLocks::new(),
        }
    }

    /// Fetch the live object, diff it and submit the patched object when
    /// an update is needed.
    pub async fn reconcile<R, C>(
        &self,
        client: &C,
        expected: &R,
        original: Option<&R>,
    ) -> HandlerResult<Reconciliation<R>>
    where
        R: Resource,
        C: ResourceClient<R> + ?Sized,
    {
        expected.validate()?;
        let key = expected.key();
        let _guard = self.locks.lock(&key).await;

        let result = self.diff(client, expected, original).await?;
        if result.is_empty() {
            info!(%key, outcome = %Outcome::Unchanged, "reconciled");
            return Ok(Reconciliation {
                outcome: Outcome::Unchanged,
                result,
                stored: None,
            });
        }

        let outcome = if result.is_creation() {
            Outcome::Created
        } else {
            Outcome::Updated
        };
        let stored = client.create_or_update(&result.patched).await?;
        info!(
            %key,
            %outcome,
            fingerprint = %result.modified_fingerprint().short(),
            "reconciled"
        );
        Ok(Reconciliation {
            outcome,
            result,
            stored: Some(stored),
        })
    }

    /// Like [`reconcile`](Self::reconcile) but never submits.
    pub async fn plan<R, C>(
        &self,
        client: &C,
        expected: &R,
        original: Option<&R>,
    ) -> HandlerResult<Reconciliation<R>>
    where
        R: Resource,
        C: ResourceClient<R> + ?Sized,
    {
        expected.validate()?;
        let result = self.diff(client, expected, original).await?;
        let outcome = match (result.is_empty(), result.is_creation()) {
            (true, _) => Outcome::Unchanged,
            (false, true) => Outcome::Created,
            (false, false) => Outcome::Updated,
        };
        debug!(key = %expected.key(), %outcome, "planned");
        Ok(Reconciliation {
            outcome,
            result,
            stored: None,
        })
    }

    async fn diff<R, C>(&self, client: &C, expected: &R, original: Option<&R>) -> HandlerResult<PatchResult<R>>
    where
        R: Resource,
        C: ResourceClient<R> + ?Sized,
    {
        let actual = client.get(expected.id()).await?;
        Ok(adapter::diff_with(&self.maker, actual.as_ref(), expected, original)?)
    }
}
