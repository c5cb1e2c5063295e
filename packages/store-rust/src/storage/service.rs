//! Context-scoped versioned storage service.
//!
//! [`StorageService`] is the public contract: create/read/update/delete with
//! optimistic-concurrency versioning, per-record TTL, and context-wide bulk
//! operations. It is written once against the [`KeyMapping`](super::KeyMapping)
//! seam, so the per-context and shared-collection layouts share identical
//! concurrency logic. The service holds no mutable state of its own; all
//! coordination goes through the [`DataGrid`](super::DataGrid) and
//! [`LockService`](super::LockService) collaborators.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use sessiongrid_core::{RecordCodec, StorageRecord};
use tracing::debug;

use super::error::StorageError;
use super::grid::{DataGrid, PageCursor};
use super::lock::LockService;
use super::mapping::KeyMapping;
use super::scanner::{ContextScanner, DEFAULT_PAGE_SIZE};

/// Returns the current wall-clock time as milliseconds since the Unix epoch.
///
/// Millisecond timestamps fit comfortably in i64 until the year 292 million.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Translates an absolute expiration into the grid's relative TTL.
///
/// `None` and `Some(0)` both mean "never expire" and map to no TTL. An
/// expiration at or before `now` still yields a minimal positive TTL: a zero
/// TTL is the grid's "never expire" sentinel, the opposite of what an
/// already-elapsed expiration means.
#[must_use]
pub fn backend_ttl(expiration: Option<i64>, now_millis: i64) -> Option<Duration> {
    match expiration {
        None | Some(0) => None,
        // The difference is checked positive before the cast.
        #[allow(clippy::cast_sign_loss)]
        Some(expiration) if expiration > now_millis => {
            Some(Duration::from_millis((expiration - now_millis) as u64))
        }
        Some(_) => Some(Duration::from_millis(1)),
    }
}

/// Configuration for storage behavior.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Keys fetched per page during context-wide scans.
    pub page_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Outcome of a version-aware read.
///
/// `Absent` is a distinct outcome, never conflated with `Unchanged`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionedRead {
    /// No live record exists at the logical address.
    Absent,
    /// The stored version equals the caller's known version; the value is
    /// not transferred.
    Unchanged {
        /// The stored (and caller-known) version.
        version: u64,
    },
    /// The stored version differs from the caller's known version.
    Current {
        /// The stored version.
        version: u64,
        /// The stored record.
        record: StorageRecord,
    },
}

/// Lock name guarding a single logical record.
fn lock_name(context: &str, key: &str) -> String {
    format!("{context}:{key}")
}

/// Folds the outcome of a locked section with the outcome of the release.
///
/// The section's own error wins; a release failure only surfaces when the
/// section succeeded.
fn merge_release<T>(
    outcome: Result<T, StorageError>,
    released: anyhow::Result<()>,
) -> Result<T, StorageError> {
    match (outcome, released) {
        (Err(err), _) => Err(err),
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(err)) => Err(StorageError::Backend(err)),
    }
}

/// Context-scoped versioned key-value storage over a distributed grid.
///
/// Stateless and callable concurrently from any number of tasks; per-key
/// read-modify-write sequences are serialized through the lock collaborator,
/// everything else relies on the grid's atomic single-key operations.
pub struct StorageService {
    grid: Arc<dyn DataGrid>,
    locks: Arc<dyn LockService>,
    codec: Arc<dyn RecordCodec>,
    mapping: Arc<dyn KeyMapping>,
    scanner: ContextScanner,
}

impl StorageService {
    /// Creates a service over the given collaborators.
    #[must_use]
    pub fn new(
        grid: Arc<dyn DataGrid>,
        locks: Arc<dyn LockService>,
        codec: Arc<dyn RecordCodec>,
        mapping: Arc<dyn KeyMapping>,
        config: StorageConfig,
    ) -> Self {
        let StorageConfig { page_size } = config;
        let scanner = ContextScanner::new(Arc::clone(&grid), Arc::clone(&mapping), page_size);
        Self {
            grid,
            locks,
            codec,
            mapping,
            scanner,
        }
    }

    /// Creates a version-1 record at `(context, key)`.
    ///
    /// Returns `false` if a live record already exists; an expired entry
    /// that the grid has not evicted yet does not block creation.
    ///
    /// # Errors
    /// Propagates backend and codec failures.
    pub async fn create(
        &self,
        context: &str,
        key: &str,
        value: &str,
        expiration: Option<i64>,
    ) -> Result<bool, StorageError> {
        let collection = self.mapping.collection(context);
        let physical_key = self.mapping.physical_key(context, key);
        let now = now_millis();

        if let Some(bytes) = self.grid.get(&collection, &physical_key).await? {
            let existing = self.codec.decode(&bytes)?;
            if !existing.is_expired(now) {
                return Ok(false);
            }
        }

        let record = StorageRecord::new(value, expiration);
        let bytes = self.codec.encode(&record)?;
        self.grid
            .put(&collection, &physical_key, bytes, backend_ttl(expiration, now))
            .await?;
        debug!(context, key, "created record");
        Ok(true)
    }

    /// Reads the current record, or `None` if absent or expired.
    ///
    /// Pure point-in-time read; takes no lock.
    ///
    /// # Errors
    /// Propagates backend and codec failures.
    pub async fn read(
        &self,
        context: &str,
        key: &str,
    ) -> Result<Option<StorageRecord>, StorageError> {
        match self.do_read(context, key, None).await? {
            VersionedRead::Current { record, .. } => Ok(Some(record)),
            VersionedRead::Absent | VersionedRead::Unchanged { .. } => Ok(None),
        }
    }

    /// Reads the record only if it changed since `known_version`.
    ///
    /// Returns [`VersionedRead::Unchanged`] without transferring the value
    /// when the caller's cache is fresh.
    ///
    /// # Errors
    /// Propagates backend and codec failures.
    pub async fn read_versioned(
        &self,
        context: &str,
        key: &str,
        known_version: u64,
    ) -> Result<VersionedRead, StorageError> {
        self.do_read(context, key, Some(known_version)).await
    }

    async fn do_read(
        &self,
        context: &str,
        key: &str,
        known_version: Option<u64>,
    ) -> Result<VersionedRead, StorageError> {
        let collection = self.mapping.collection(context);
        let physical_key = self.mapping.physical_key(context, key);

        let Some(bytes) = self.grid.get(&collection, &physical_key).await? else {
            return Ok(VersionedRead::Absent);
        };
        let record = self.codec.decode(&bytes)?;
        if record.is_expired(now_millis()) {
            return Ok(VersionedRead::Absent);
        }

        let version = record.version();
        if known_version == Some(version) {
            return Ok(VersionedRead::Unchanged { version });
        }
        Ok(VersionedRead::Current { version, record })
    }

    /// Replaces the value (version += 1) and sets the expiration.
    ///
    /// Returns `false` if no live record exists.
    ///
    /// # Errors
    /// Propagates backend and codec failures.
    pub async fn update(
        &self,
        context: &str,
        key: &str,
        value: &str,
        expiration: Option<i64>,
    ) -> Result<bool, StorageError> {
        Ok(self
            .do_update(None, context, key, Some(value), expiration)
            .await?
            .is_some())
    }

    /// As [`update`](Self::update), but only if the stored version equals
    /// `expected_version` at the locked check.
    ///
    /// Returns the new version on success, `None` if no live record exists.
    ///
    /// # Errors
    /// [`StorageError::VersionConflict`] on a version mismatch (no mutation
    /// occurs); backend and codec failures are propagated.
    pub async fn update_with_version(
        &self,
        expected_version: u64,
        context: &str,
        key: &str,
        value: &str,
        expiration: Option<i64>,
    ) -> Result<Option<u64>, StorageError> {
        self.do_update(Some(expected_version), context, key, Some(value), expiration)
            .await
    }

    /// Sets the expiration (and physical TTL) without touching value or
    /// version.
    ///
    /// Returns `false` if no live record exists.
    ///
    /// # Errors
    /// Propagates backend and codec failures.
    pub async fn update_expiration(
        &self,
        context: &str,
        key: &str,
        expiration: Option<i64>,
    ) -> Result<bool, StorageError> {
        Ok(self
            .do_update(None, context, key, None, expiration)
            .await?
            .is_some())
    }

    /// Shared locked read-modify-write path for all `update*` operations.
    async fn do_update(
        &self,
        expected_version: Option<u64>,
        context: &str,
        key: &str,
        value: Option<&str>,
        expiration: Option<i64>,
    ) -> Result<Option<u64>, StorageError> {
        let handle = self.locks.acquire(&lock_name(context, key)).await?;
        let outcome = self
            .apply_update(expected_version, context, key, value, expiration)
            .await;
        let released = self.locks.release(handle).await;
        merge_release(outcome, released)
    }

    async fn apply_update(
        &self,
        expected_version: Option<u64>,
        context: &str,
        key: &str,
        value: Option<&str>,
        expiration: Option<i64>,
    ) -> Result<Option<u64>, StorageError> {
        let VersionedRead::Current { mut record, .. } = self.do_read(context, key, None).await?
        else {
            return Ok(None);
        };

        if let Some(expected) = expected_version {
            if expected != record.version() {
                return Err(StorageError::VersionConflict {
                    expected,
                    actual: record.version(),
                });
            }
        }

        if let Some(value) = value {
            record.set_value(value);
            record.increment_version();
        }
        record.set_expiration(expiration);

        let bytes = self.codec.encode(&record)?;
        let collection = self.mapping.collection(context);
        let physical_key = self.mapping.physical_key(context, key);
        self.grid
            .put(
                &collection,
                &physical_key,
                bytes,
                backend_ttl(record.expiration(), now_millis()),
            )
            .await?;
        debug!(context, key, version = record.version(), "updated record");
        Ok(Some(record.version()))
    }

    /// Removes the record. Returns `false` if absent or expired.
    ///
    /// Collection-level removal is atomic, so no per-key lock is taken.
    ///
    /// # Errors
    /// Propagates backend and codec failures.
    pub async fn delete(&self, context: &str, key: &str) -> Result<bool, StorageError> {
        self.do_delete(None, context, key).await
    }

    /// As [`delete`](Self::delete), but only if the stored version equals
    /// `expected_version`.
    ///
    /// # Errors
    /// [`StorageError::VersionConflict`] on a version mismatch (the record
    /// is left untouched); backend and codec failures are propagated.
    pub async fn delete_with_version(
        &self,
        expected_version: u64,
        context: &str,
        key: &str,
    ) -> Result<bool, StorageError> {
        self.do_delete(Some(expected_version), context, key).await
    }

    async fn do_delete(
        &self,
        expected_version: Option<u64>,
        context: &str,
        key: &str,
    ) -> Result<bool, StorageError> {
        let collection = self.mapping.collection(context);
        let physical_key = self.mapping.physical_key(context, key);

        let Some(bytes) = self.grid.get(&collection, &physical_key).await? else {
            return Ok(false);
        };
        let record = self.codec.decode(&bytes)?;
        if record.is_expired(now_millis()) {
            return Ok(false);
        }

        if let Some(expected) = expected_version {
            if expected != record.version() {
                return Err(StorageError::VersionConflict {
                    expected,
                    actual: record.version(),
                });
            }
        }

        let removed = self.grid.remove(&collection, &physical_key).await?;
        debug!(context, key, removed, "deleted record");
        Ok(removed)
    }

    /// Sets the expiration on every live record in the context.
    ///
    /// Holds a coarse lock named after the context for the duration of the
    /// scan, serializing concurrent bulk operations on the same context.
    /// Each record is updated through the ordinary locked single-key path;
    /// the batch as a whole is not atomic.
    ///
    /// # Errors
    /// Propagates backend and codec failures; completed pages stay applied.
    pub async fn update_context_expiration(
        &self,
        context: &str,
        expiration: Option<i64>,
    ) -> Result<(), StorageError> {
        let handle = self.locks.acquire(context).await?;
        let outcome = self.scan_update_expiration(context, expiration).await;
        let released = self.locks.release(handle).await;
        merge_release(outcome, released)
    }

    async fn scan_update_expiration(
        &self,
        context: &str,
        expiration: Option<i64>,
    ) -> Result<(), StorageError> {
        let mut cursor = PageCursor::start();
        loop {
            let page = self.scanner.next_page(context, &cursor).await?;
            for physical_key in &page.items {
                // A key that disappeared mid-scan reports false and is skipped.
                self.update_expiration(context, physical_key.key(), expiration)
                    .await?;
            }
            if page.next_cursor.finished {
                break;
            }
            cursor = page.next_cursor;
        }
        debug!(context, "updated context expiration");
        Ok(())
    }

    /// Removes every record belonging to the context.
    ///
    /// When the layout gives the context its own collection, this is one
    /// `clear` call. On the shared layout the filtered key set is drained
    /// page by page; each round re-fetches the first page because removals
    /// shrink the set under the cursor.
    ///
    /// # Errors
    /// Propagates backend failures; pages removed before the failure stay
    /// removed.
    pub async fn delete_context(&self, context: &str) -> Result<(), StorageError> {
        let collection = self.mapping.collection(context);
        if self.mapping.context_filter(context).is_none() {
            // The collection holds exactly this context.
            self.grid.clear(&collection).await?;
            debug!(context, "cleared context collection");
            return Ok(());
        }

        loop {
            let page = self.scanner.next_page(context, &PageCursor::start()).await?;
            if page.items.is_empty() {
                break;
            }
            let mut removed = 0_usize;
            for physical_key in &page.items {
                if self.grid.remove(&collection, physical_key).await? {
                    removed += 1;
                }
            }
            // A page that removes nothing means the scan view is stale;
            // stop rather than spin.
            if removed == 0 {
                break;
            }
        }
        debug!(context, "deleted context");
        Ok(())
    }

    /// Intentionally a no-op: expiration is delegated entirely to the
    /// grid's native TTL mechanism, so there is nothing to sweep.
    ///
    /// # Errors
    /// Never fails.
    pub async fn reap(&self, _context: &str) -> Result<(), StorageError> {
        Ok(())
    }
}
