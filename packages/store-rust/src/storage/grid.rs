//! Backing data-grid collaborator trait and cursor-based scan types.
//!
//! Defines [`DataGrid`], the seam to the distributed keyed-collection
//! service. The grid stores opaque bytes under a [`GridKey`] inside a named
//! collection, honors a native per-entry TTL, and supports resumable paged
//! key scans for context-wide bulk operations.

use std::time::Duration;

use async_trait::async_trait;
use sessiongrid_core::GridKey;

/// Opaque cursor for resumable paged scans over a collection.
///
/// Implementations encode their position in the `state` field. Consumers
/// treat `state` as opaque and only check `finished`.
#[derive(Debug, Clone)]
pub struct PageCursor {
    /// Opaque state for the grid implementation to resume the scan.
    pub state: Vec<u8>,
    /// Whether the scan has completed (no more entries).
    pub finished: bool,
}

impl PageCursor {
    /// Creates a cursor positioned at the beginning of the collection.
    #[must_use]
    pub fn start() -> Self {
        Self {
            state: Vec::new(),
            finished: false,
        }
    }
}

/// Result of a cursor-based fetch operation.
#[derive(Debug)]
pub struct FetchResult<T> {
    /// The fetched items.
    pub items: Vec<T>,
    /// Updated cursor for the next fetch call.
    pub next_cursor: PageCursor,
}

/// Server-side predicate for filtered key scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyFilter {
    /// Matches composite keys whose context component equals the given
    /// context. Used to carve one context out of a shared collection.
    ContextEquals(String),
}

/// Distributed keyed-collection collaborator.
///
/// The grid is the only durable state the storage service touches. Single-key
/// operations are atomic; a scan observes an eventually-settling view and may
/// miss or repeat entries mutated mid-scan. A `ttl` of `None` means the entry
/// never expires.
///
/// Used as `Arc<dyn DataGrid>`.
#[async_trait]
pub trait DataGrid: Send + Sync {
    /// Fetch the bytes stored under a key, or `None` if absent or expired.
    async fn get(&self, collection: &str, key: &GridKey) -> anyhow::Result<Option<Vec<u8>>>;

    /// Insert or replace an entry. `ttl` of `None` means never expire.
    async fn put(
        &self,
        collection: &str,
        key: &GridKey,
        bytes: Vec<u8>,
        ttl: Option<Duration>,
    ) -> anyhow::Result<()>;

    /// Whether a live entry exists under the key.
    async fn contains_key(&self, collection: &str, key: &GridKey) -> anyhow::Result<bool>;

    /// Remove an entry, returning whether a live entry was removed.
    async fn remove(&self, collection: &str, key: &GridKey) -> anyhow::Result<bool>;

    /// Remove every entry in the collection.
    async fn clear(&self, collection: &str) -> anyhow::Result<()>;

    /// Fetch up to `size` keys matching `filter`, starting from `cursor`.
    async fn fetch_keys(
        &self,
        collection: &str,
        filter: Option<&KeyFilter>,
        cursor: &PageCursor,
        size: usize,
    ) -> anyhow::Result<FetchResult<GridKey>>;
}
