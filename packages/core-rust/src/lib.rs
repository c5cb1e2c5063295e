//! `sessiongrid` Core — storage records, physical grid keys, and the record codec.

pub mod codec;
pub mod key;
pub mod record;

pub use codec::{CodecError, MsgPackCodec, RecordCodec};
pub use key::GridKey;
pub use record::StorageRecord;

#[cfg(test)]
mod tests {
    #[test]
    fn crate_loads() {
        // Empty body: if this test runs, the crate compiles and loads.
    }
}
