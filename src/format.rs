//! On-disk format definition
//!
//! ## File Layout
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ Global Header (8 bytes)                                  │
//! │   Magic: u32 (4) | Format Version: u32 (4)               │
//! ├──────────────────────────────────────────────────────────┤
//! │ Slot 0                                                   │
//! │   Key: u64 (8) | Len: u32 (4) | Cap: u32 (4) | Ver: u32 (4) │
//! │   Payload (Cap bytes, Len of them meaningful)            │
//! │   Padding up to the next 4-byte boundary                 │
//! ├──────────────────────────────────────────────────────────┤
//! │ Slot 1 ...                                               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! All integers use the writer's native byte order. `Len == u32::MAX`
//! marks a tombstone.

use crate::error::{Result, SlotError};

/// Magic number identifying a slotkv file
pub const MAGIC: u32 = 287_173_871;

/// Current on-disk format version
pub const FORMAT_VERSION: u32 = 1;

/// Global header size: Magic (4) + Version (4)
pub const GLOBAL_HEADER_SIZE: u64 = 8;

/// Slot header size: Key (8) + Len (4) + Cap (4) + Version (4)
pub const RECORD_HEADER_SIZE: usize = 20;

/// Every slot starts on a multiple of this many bytes
pub const SLOT_ALIGNMENT: u64 = 4;

/// Length value marking a deleted slot
pub const TOMBSTONE_LEN: u32 = u32::MAX;

/// Largest payload accepted by an upsert.
///
/// The sentinel and one value of headroom below it are reserved.
pub const MAX_PAYLOAD_LEN: u32 = TOMBSTONE_LEN - 2;

/// Encode the global file header.
pub fn encode_global_header() -> [u8; GLOBAL_HEADER_SIZE as usize] {
    let mut buf = [0u8; GLOBAL_HEADER_SIZE as usize];
    buf[0..4].copy_from_slice(&MAGIC.to_ne_bytes());
    buf[4..8].copy_from_slice(&FORMAT_VERSION.to_ne_bytes());
    buf
}

/// Validate the global file header.
pub fn check_global_header(bytes: &[u8; GLOBAL_HEADER_SIZE as usize]) -> Result<()> {
    let magic = u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    if magic != MAGIC {
        return Err(SlotError::Format(format!(
            "invalid magic number {}: not a slotkv file",
            magic
        )));
    }

    let version = u32::from_ne_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != FORMAT_VERSION {
        return Err(SlotError::Format(format!(
            "unsupported format version: {}",
            version
        )));
    }

    Ok(())
}

/// Round `offset` up to the next multiple of `alignment` (a power of two).
pub fn align_up(offset: u64, alignment: u64) -> u64 {
    debug_assert!(alignment.is_power_of_two());
    (offset + alignment - 1) & !(alignment - 1)
}

/// Total bytes a slot occupies on disk, including header and tail padding.
pub fn slot_footprint(capacity: u32) -> u64 {
    align_up(RECORD_HEADER_SIZE as u64 + capacity as u64, SLOT_ALIGNMENT)
}
