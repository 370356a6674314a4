//! Record Module
//!
//! Keys, slot metadata, and the slot header codec.
//!
//! ## Responsibilities
//! - Pack/unpack the fixed 20-byte slot header
//! - Describe where a key's authoritative slot lives
//! - Decide how much room a new slot reserves (capacity policy)

mod capacity;
mod header;

use std::fmt;

pub use capacity::{CapacityPolicy, ExactCapacity, PaddedCapacity};
pub(crate) use capacity::checked_capacity;
pub use header::{is_tombstone, RecordHeader};

use crate::format::{self, TOMBSTONE_LEN};

/// Opaque 64-bit record identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(pub u64);

impl From<u64> for Key {
    fn from(val: u64) -> Self {
        Key(val)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Location and shape of a key's authoritative slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordInfo {
    /// Byte offset of the slot header in the file
    pub offset: u64,
    /// Meaningful payload bytes, or `TOMBSTONE_LEN` if deleted
    pub len: u32,
    /// Payload bytes physically reserved
    pub capacity: u32,
    /// Relocation counter for this key
    pub version: u32,
}

impl RecordInfo {
    /// A live record (not a tombstone)
    pub fn is_valid(&self) -> bool {
        self.len != TOMBSTONE_LEN
    }

    /// Offset of the first payload byte
    pub fn payload_offset(&self) -> u64 {
        self.offset + format::RECORD_HEADER_SIZE as u64
    }

    /// Bytes the slot occupies on disk, header and padding included
    pub fn footprint(&self) -> u64 {
        format::slot_footprint(self.capacity)
    }
}
