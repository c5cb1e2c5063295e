//! Resumable paged iteration over one context's keyspace.
//!
//! A context may hold a large keyspace on a distributed grid, so bulk
//! operations never materialize it whole or hold a single lock for the full
//! sweep. [`ContextScanner`] fetches fixed-size pages of keys through the
//! [`KeyMapping`] seam; callers act on each page via the ordinary single-key
//! operations and advance (or restart) the cursor. Pages already processed
//! stay applied if the scan is interrupted.

use std::sync::Arc;

use sessiongrid_core::GridKey;

use super::grid::{DataGrid, FetchResult, PageCursor};
use super::mapping::KeyMapping;

/// Page size used when the configuration does not override it.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Pages through the keys a [`KeyMapping`] exposes for a context.
pub struct ContextScanner {
    grid: Arc<dyn DataGrid>,
    mapping: Arc<dyn KeyMapping>,
    page_size: usize,
}

impl ContextScanner {
    /// Creates a scanner fetching `page_size` keys per page.
    ///
    /// A `page_size` of 0 falls back to [`DEFAULT_PAGE_SIZE`].
    #[must_use]
    pub fn new(grid: Arc<dyn DataGrid>, mapping: Arc<dyn KeyMapping>, page_size: usize) -> Self {
        Self {
            grid,
            mapping,
            page_size: if page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                page_size
            },
        }
    }

    /// Fetches the next page of keys belonging to `context`.
    ///
    /// Pass [`PageCursor::start`] for the first page and the returned
    /// `next_cursor` thereafter; `finished` marks the end of the scan.
    pub async fn next_page(
        &self,
        context: &str,
        cursor: &PageCursor,
    ) -> anyhow::Result<FetchResult<GridKey>> {
        let collection = self.mapping.collection(context);
        let filter = self.mapping.context_filter(context);
        self.grid
            .fetch_keys(&collection, filter.as_ref(), cursor, self.page_size)
            .await
    }
}
