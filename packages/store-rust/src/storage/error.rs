//! Storage service error taxonomy.

use sessiongrid_core::CodecError;

/// Errors surfaced by [`StorageService`](super::StorageService) operations.
///
/// "Not found" is a normal result (`false` / `None` /
/// [`VersionedRead::Absent`](super::VersionedRead)), never an error. Backend
/// failures are propagated without internal retries; retry policy belongs to
/// the caller.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The caller's expected version did not match the stored version at the
    /// instant of the locked check. No mutation occurred. Distinct from "not
    /// found" so callers can retry-with-refresh instead of treat-as-gone.
    #[error("version conflict: expected {expected}, stored {actual}")]
    VersionConflict {
        /// Version the caller expected.
        expected: u64,
        /// Version actually stored.
        actual: u64,
    },

    /// The backing grid or lock collaborator failed to respond.
    #[error("backing store unavailable: {0}")]
    Backend(#[from] anyhow::Error),

    /// A stored record failed to decode. Data-integrity failure, never
    /// folded into "not found".
    #[error(transparent)]
    Codec(#[from] CodecError),
}
