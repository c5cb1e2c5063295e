//! Record codec contract and the default `MsgPack` implementation.
//!
//! The backing grid stores opaque bytes; a [`RecordCodec`] turns a
//! [`StorageRecord`] into those bytes and back. The codec must round-trip
//! value, version, and expiration exactly, including the "no expiration"
//! case distinctly from any finite value.

use crate::record::StorageRecord;

/// Codec failure.
///
/// Decode errors are data-integrity failures and are never treated as a
/// missing record.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("record encode failed: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("record decode failed: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

/// Encodes and decodes records for transport through the backing grid.
///
/// Used as `Arc<dyn RecordCodec>` so deployments can swap the wire format
/// without touching the storage service.
pub trait RecordCodec: Send + Sync {
    /// Serializes a record to bytes.
    ///
    /// # Errors
    /// Returns [`CodecError::Encode`] if serialization fails.
    fn encode(&self, record: &StorageRecord) -> Result<Vec<u8>, CodecError>;

    /// Deserializes a record from bytes.
    ///
    /// # Errors
    /// Returns [`CodecError::Decode`] on malformed input.
    fn decode(&self, bytes: &[u8]) -> Result<StorageRecord, CodecError>;
}

/// Default codec: `MsgPack` via `rmp-serde`.
///
/// `Option<i64>` expirations round-trip as nil vs integer, so `None` stays
/// distinct from `Some(0)` on the wire.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackCodec;

impl RecordCodec for MsgPackCodec {
    fn encode(&self, record: &StorageRecord) -> Result<Vec<u8>, CodecError> {
        Ok(rmp_serde::to_vec(record)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<StorageRecord, CodecError> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn round_trip(record: &StorageRecord) -> StorageRecord {
        let codec = MsgPackCodec;
        let bytes = codec.encode(record).expect("encode");
        codec.decode(&bytes).expect("decode")
    }

    #[test]
    fn round_trips_plain_record() {
        let record = StorageRecord::new("hello", Some(1_700_000_000_000));
        assert_eq!(round_trip(&record), record);
    }

    #[test]
    fn none_expiration_stays_distinct_from_zero() {
        let none = StorageRecord::new("v", None);
        let zero = StorageRecord::new("v", Some(0));

        let decoded_none = round_trip(&none);
        let decoded_zero = round_trip(&zero);

        assert_eq!(decoded_none.expiration(), None);
        assert_eq!(decoded_zero.expiration(), Some(0));
        assert_ne!(decoded_none, decoded_zero);
    }

    #[test]
    fn round_trips_incremented_versions() {
        let mut record = StorageRecord::new("v", None);
        for _ in 0..41 {
            record.increment_version();
        }
        assert_eq!(round_trip(&record).version(), 42);
    }

    #[test]
    fn malformed_bytes_fail_decode() {
        let codec = MsgPackCodec;
        let err = codec.decode(&[0xc1, 0xff, 0x00]).unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn empty_input_fails_decode() {
        let codec = MsgPackCodec;
        assert!(codec.decode(&[]).is_err());
    }

    proptest! {
        #[test]
        fn round_trip_preserves_all_fields(
            value in ".*",
            bumps in 0u32..200,
            expiration in proptest::option::of(any::<i64>()),
        ) {
            let mut record = StorageRecord::new(value, expiration);
            for _ in 0..bumps {
                record.increment_version();
            }
            prop_assert_eq!(round_trip(&record), record);
        }
    }
}
