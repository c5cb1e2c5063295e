//! In-process [`LockService`] implementation.
//!
//! Stands in for the cluster-wide lock primitive in tests and single-node
//! deployments. One binary semaphore per lock name; handles carry a fencing
//! token so only the current holder can release.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::storage::lock::{LockHandle, LockService};

/// Per-name async mutual exclusion backed by binary semaphores.
///
/// `acquire` parks the caller until the holder releases; there is no
/// timeout, matching the base lock contract.
pub struct InMemoryLockService {
    semaphores: DashMap<String, Arc<Semaphore>>,
    holders: Mutex<HashMap<String, Uuid>>,
}

impl InMemoryLockService {
    /// Creates a lock service with no locks held.
    #[must_use]
    pub fn new() -> Self {
        Self {
            semaphores: DashMap::new(),
            holders: Mutex::new(HashMap::new()),
        }
    }

    fn semaphore(&self, name: &str) -> Arc<Semaphore> {
        // Clone the Arc out so no shard guard is held across an await.
        self.semaphores
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(1)))
            .value()
            .clone()
    }
}

impl Default for InMemoryLockService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LockService for InMemoryLockService {
    async fn acquire(&self, name: &str) -> anyhow::Result<LockHandle> {
        let semaphore = self.semaphore(name);
        let permit = semaphore.acquire_owned().await?;
        // The permit is returned through release(), not by dropping.
        permit.forget();

        let token = Uuid::new_v4();
        self.holders.lock().insert(name.to_string(), token);
        Ok(LockHandle::new(name, token))
    }

    async fn release(&self, handle: LockHandle) -> anyhow::Result<()> {
        {
            let mut holders = self.holders.lock();
            match holders.get(handle.name()) {
                Some(token) if *token == handle.token() => {
                    holders.remove(handle.name());
                }
                _ => anyhow::bail!("lock {:?} is not held by this handle", handle.name()),
            }
        }

        let semaphore = self
            .semaphores
            .get(handle.name())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| anyhow::anyhow!("unknown lock {:?}", handle.name()))?;
        semaphore.add_permits(1);
        Ok(())
    }
}
