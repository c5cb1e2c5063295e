//! In-memory [`DataGrid`] implementation backed by [`DashMap`].
//!
//! Provides concurrent access without external locking, honors per-entry
//! TTLs, and supports offset-cursor key scans. Suitable for tests and
//! single-node deployments where all data fits in memory.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use sessiongrid_core::GridKey;

use crate::storage::grid::{DataGrid, FetchResult, KeyFilter, PageCursor};
use crate::storage::service::now_millis;

/// A stored entry: opaque bytes plus an absolute eviction deadline.
#[derive(Debug, Clone)]
struct GridEntry {
    bytes: Vec<u8>,
    /// Epoch millis after which the entry is gone. `None` = never expires.
    expires_at: Option<i64>,
}

impl GridEntry {
    fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// In-memory grid of named collections, each a [`DashMap`] keyed by
/// [`GridKey`].
///
/// Expired entries are dropped lazily on access; a scan never yields them.
/// Collections are created on first touch and survive `clear`.
pub struct InMemoryGrid {
    collections: DashMap<String, Arc<DashMap<GridKey, GridEntry>>>,
}

impl InMemoryGrid {
    /// Creates a new, empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: DashMap::new(),
        }
    }

    fn collection(&self, name: &str) -> Arc<DashMap<GridKey, GridEntry>> {
        self.collections
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(DashMap::new()))
            .value()
            .clone()
    }

    /// Live keys of a collection, sorted so cursor pages observe a stable
    /// order across calls.
    fn live_keys(&self, name: &str, filter: Option<&KeyFilter>, now: i64) -> Vec<GridKey> {
        let collection = self.collection(name);
        let mut keys: Vec<GridKey> = collection
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .filter(|entry| matches_filter(filter, entry.key()))
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();
        keys
    }
}

impl Default for InMemoryGrid {
    fn default() -> Self {
        Self::new()
    }
}

fn matches_filter(filter: Option<&KeyFilter>, key: &GridKey) -> bool {
    match filter {
        None => true,
        Some(KeyFilter::ContextEquals(context)) => key.context() == Some(context.as_str()),
    }
}

/// Decodes a cursor's opaque state into a `u64` offset.
///
/// Empty state (from `PageCursor::start()`) is treated as offset 0.
fn decode_cursor_offset(cursor: &PageCursor) -> u64 {
    if cursor.state.is_empty() {
        0
    } else {
        let mut buf = [0u8; 8];
        let len = cursor.state.len().min(8);
        buf[..len].copy_from_slice(&cursor.state[..len]);
        u64::from_le_bytes(buf)
    }
}

/// Encodes an offset into cursor state bytes (little-endian `u64`).
fn encode_cursor_offset(offset: u64) -> Vec<u8> {
    offset.to_le_bytes().to_vec()
}

#[async_trait]
impl DataGrid for InMemoryGrid {
    async fn get(&self, collection: &str, key: &GridKey) -> anyhow::Result<Option<Vec<u8>>> {
        let collection = self.collection(collection);
        let now = now_millis();
        let Some(entry) = collection.get(key).map(|e| e.value().clone()) else {
            return Ok(None);
        };
        if entry.is_expired(now) {
            collection.remove(key);
            return Ok(None);
        }
        Ok(Some(entry.bytes))
    }

    async fn put(
        &self,
        collection: &str,
        key: &GridKey,
        bytes: Vec<u8>,
        ttl: Option<Duration>,
    ) -> anyhow::Result<()> {
        // TTLs are reasonable millisecond durations, not near u64::MAX.
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let expires_at = ttl.map(|d| now_millis() + d.as_millis() as i64);
        self.collection(collection)
            .insert(key.clone(), GridEntry { bytes, expires_at });
        Ok(())
    }

    async fn contains_key(&self, collection: &str, key: &GridKey) -> anyhow::Result<bool> {
        Ok(self.get(collection, key).await?.is_some())
    }

    async fn remove(&self, collection: &str, key: &GridKey) -> anyhow::Result<bool> {
        let collection = self.collection(collection);
        let now = now_millis();
        match collection.remove(key) {
            Some((_, entry)) => Ok(!entry.is_expired(now)),
            None => Ok(false),
        }
    }

    async fn clear(&self, collection: &str) -> anyhow::Result<()> {
        self.collection(collection).clear();
        Ok(())
    }

    async fn fetch_keys(
        &self,
        collection: &str,
        filter: Option<&KeyFilter>,
        cursor: &PageCursor,
        size: usize,
    ) -> anyhow::Result<FetchResult<GridKey>> {
        let keys = self.live_keys(collection, filter, now_millis());
        let total = keys.len();
        // Cursor offsets are bounded by collection size, so truncation is safe.
        #[allow(clippy::cast_possible_truncation)]
        let offset = decode_cursor_offset(cursor) as usize;

        let items: Vec<GridKey> = keys.into_iter().skip(offset).take(size).collect();

        let new_offset = offset + items.len();
        let finished = new_offset >= total;

        Ok(FetchResult {
            items,
            next_cursor: PageCursor {
                state: encode_cursor_offset(new_offset as u64),
                finished,
            },
        })
    }
}
