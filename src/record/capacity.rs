//! Capacity growth policies
//!
//! A policy decides how many payload bytes a brand-new slot reserves. More
//! slack means more updates can be served in place; less slack means a
//! smaller file.

use std::fmt::Debug;

use crate::error::{Result, SlotError};
use crate::format::{self, MAX_PAYLOAD_LEN};

/// Chooses the reserved capacity for a slot holding `len` payload bytes.
///
/// Implementations must return a value `>= len`; the store rejects anything
/// smaller.
pub trait CapacityPolicy: Debug + Send + Sync {
    fn capacity_for(&self, len: u32) -> u32;
}

/// Reserve `len + slack`, rounded up to `alignment` (a power of two).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaddedCapacity {
    slack: u32,
    alignment: u32,
}

impl PaddedCapacity {
    pub fn new(slack: u32, alignment: u32) -> Self {
        assert!(alignment.is_power_of_two(), "alignment must be a power of two");
        Self { slack, alignment }
    }

    pub fn slack(&self) -> u32 {
        self.slack
    }

    pub fn alignment(&self) -> u32 {
        self.alignment
    }
}

impl Default for PaddedCapacity {
    fn default() -> Self {
        Self {
            slack: 64,
            alignment: format::SLOT_ALIGNMENT as u32,
        }
    }
}

impl CapacityPolicy for PaddedCapacity {
    fn capacity_for(&self, len: u32) -> u32 {
        let wanted = format::align_up(len as u64 + self.slack as u64, self.alignment as u64);
        // Stay clear of the sentinel range for very large payloads.
        wanted.min(MAX_PAYLOAD_LEN as u64).max(len as u64) as u32
    }
}

/// Reserve exactly `len` bytes. Every growth relocates the record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExactCapacity;

impl CapacityPolicy for ExactCapacity {
    fn capacity_for(&self, len: u32) -> u32 {
        len
    }
}

/// Ask `policy` for a capacity and hold it to the store's rules:
/// never below `len`, never above `limit`.
pub(crate) fn checked_capacity(
    policy: &dyn CapacityPolicy,
    len: u32,
    limit: Option<u32>,
) -> Result<u32> {
    let capacity = policy.capacity_for(len);
    if capacity < len {
        return Err(SlotError::InvalidArgument(format!(
            "capacity policy {:?} returned {} for a {} byte payload",
            policy, capacity, len
        )));
    }

    Ok(match limit {
        Some(limit) => capacity.min(limit.max(len)),
        None => capacity,
    })
}
