//! Slot header codec
//!
//! Explicit byte packing; the in-memory struct layout is never aliased.

use crate::format::{RECORD_HEADER_SIZE, TOMBSTONE_LEN};

use super::Key;

/// The 20-byte header in front of every slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub key: Key,
    pub len: u32,
    pub capacity: u32,
    pub version: u32,
}

impl RecordHeader {
    pub fn new(key: Key, len: u32, capacity: u32, version: u32) -> Self {
        Self {
            key,
            len,
            capacity,
            version,
        }
    }

    /// Header for a deleted slot, keeping its capacity so scans can skip it.
    pub fn tombstone(key: Key, capacity: u32, version: u32) -> Self {
        Self::new(key, TOMBSTONE_LEN, capacity, version)
    }

    /// Serialize to bytes: key (8) + len (4) + capacity (4) + version (4)
    pub fn encode(&self) -> [u8; RECORD_HEADER_SIZE] {
        let mut buf = [0u8; RECORD_HEADER_SIZE];
        buf[0..8].copy_from_slice(&self.key.0.to_ne_bytes());
        buf[8..12].copy_from_slice(&self.len.to_ne_bytes());
        buf[12..16].copy_from_slice(&self.capacity.to_ne_bytes());
        buf[16..20].copy_from_slice(&self.version.to_ne_bytes());
        buf
    }

    /// Encode into the front of `out`, which must hold at least a header.
    pub fn encode_into(&self, out: &mut [u8]) {
        out[..RECORD_HEADER_SIZE].copy_from_slice(&self.encode());
    }

    /// Deserialize from bytes
    pub fn decode(bytes: &[u8; RECORD_HEADER_SIZE]) -> Self {
        let mut key = [0u8; 8];
        key.copy_from_slice(&bytes[0..8]);
        let word = |at: usize| u32::from_ne_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);

        Self {
            key: Key(u64::from_ne_bytes(key)),
            len: word(8),
            capacity: word(12),
            version: word(16),
        }
    }

    pub fn is_tombstone(&self) -> bool {
        is_tombstone(self.len)
    }
}

/// True if `len` is the deleted-slot sentinel
pub fn is_tombstone(len: u32) -> bool {
    len == TOMBSTONE_LEN
}
