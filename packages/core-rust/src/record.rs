//! Versioned storage record entity.
//!
//! [`StorageRecord`] is the unit of storage for the whole service: a string
//! payload, a monotonically increasing version, and an optional absolute
//! expiration. Only the storage service constructs and mutates records; the
//! codec round-trips them through the backing grid.

use serde::{Deserialize, Serialize};

/// A versioned record with an optional absolute expiration.
///
/// The version starts at 1 on creation and is incremented by exactly 1 on
/// every value-changing update, never decremented. Expiration is epoch
/// milliseconds; `None` means the record never expires. A record whose
/// expiration has passed is logically absent even while the physical grid
/// entry still exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageRecord {
    value: String,
    version: u64,
    expiration: Option<i64>,
}

impl StorageRecord {
    /// Creates a version-1 record with the given value and expiration.
    #[must_use]
    pub fn new(value: impl Into<String>, expiration: Option<i64>) -> Self {
        Self {
            value: value.into(),
            version: 1,
            expiration,
        }
    }

    /// The record payload.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The current version, always >= 1.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Absolute expiration in epoch milliseconds, `None` = never expires.
    #[must_use]
    pub fn expiration(&self) -> Option<i64> {
        self.expiration
    }

    /// Replaces the payload. Callers that change the value must also call
    /// [`increment_version`](Self::increment_version).
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Replaces the expiration; `None` clears it.
    pub fn set_expiration(&mut self, expiration: Option<i64>) {
        self.expiration = expiration;
    }

    /// Bumps the version by exactly 1.
    pub fn increment_version(&mut self) {
        self.version = self.version.saturating_add(1);
    }

    /// Whether the record is logically gone at `now_millis`.
    ///
    /// An expiration of 0 means "no expiration", same as `None`.
    #[must_use]
    pub fn is_expired(&self, now_millis: i64) -> bool {
        match self.expiration {
            None | Some(0) => false,
            Some(expiration) => expiration <= now_millis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_starts_at_version_one() {
        let record = StorageRecord::new("payload", None);
        assert_eq!(record.version(), 1);
        assert_eq!(record.value(), "payload");
        assert_eq!(record.expiration(), None);
    }

    #[test]
    fn increment_version_bumps_by_one() {
        let mut record = StorageRecord::new("v", None);
        record.increment_version();
        assert_eq!(record.version(), 2);
        record.increment_version();
        assert_eq!(record.version(), 3);
    }

    #[test]
    fn set_value_does_not_touch_version() {
        let mut record = StorageRecord::new("old", None);
        record.set_value("new");
        assert_eq!(record.value(), "new");
        assert_eq!(record.version(), 1);
    }

    #[test]
    fn is_expired_with_future_expiration() {
        let record = StorageRecord::new("v", Some(10_000));
        assert!(!record.is_expired(9_999));
        assert!(record.is_expired(10_000));
        assert!(record.is_expired(10_001));
    }

    #[test]
    fn no_expiration_never_expires() {
        let record = StorageRecord::new("v", None);
        assert!(!record.is_expired(i64::MAX));
    }

    #[test]
    fn zero_expiration_means_no_expiration() {
        let record = StorageRecord::new("v", Some(0));
        assert!(!record.is_expired(i64::MAX));
    }

    #[test]
    fn set_expiration_can_clear() {
        let mut record = StorageRecord::new("v", Some(5_000));
        record.set_expiration(None);
        assert_eq!(record.expiration(), None);
        assert!(!record.is_expired(6_000));
    }
}
