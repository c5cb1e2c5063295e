//! Distributed named-lock collaborator trait.
//!
//! The storage service serializes read-modify-write sequences through
//! cluster-wide named locks. [`LockService`] is the seam to that primitive;
//! the service guarantees [`release`](LockService::release) on every exit
//! path of a locked section, including error paths.

use async_trait::async_trait;
use uuid::Uuid;

/// Proof of an acquired lock.
///
/// Carries the lock name and a fencing token so a release by anyone other
/// than the current holder can be rejected. Handles are single-use and
/// deliberately not `Clone`.
#[derive(Debug)]
pub struct LockHandle {
    name: String,
    token: Uuid,
}

impl LockHandle {
    /// Creates a handle. Only lock service implementations construct these.
    #[must_use]
    pub fn new(name: impl Into<String>, token: Uuid) -> Self {
        Self {
            name: name.into(),
            token,
        }
    }

    /// The lock name this handle was granted for.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The fencing token minted at acquisition.
    #[must_use]
    pub fn token(&self) -> Uuid {
        self.token
    }
}

/// Cluster-wide named mutual exclusion.
///
/// `acquire` blocks until the lock is granted; the base contract has no
/// timeout, callers needing bounded waits wrap the call. Used as
/// `Arc<dyn LockService>`.
#[async_trait]
pub trait LockService: Send + Sync {
    /// Acquire the named lock, blocking until granted.
    async fn acquire(&self, name: &str) -> anyhow::Result<LockHandle>;

    /// Release a previously acquired lock.
    async fn release(&self, handle: LockHandle) -> anyhow::Result<()>;
}
