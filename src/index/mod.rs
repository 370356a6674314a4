//! Index Module
//!
//! In-memory map from key to the key's authoritative slot.
//!
//! ## Responsibilities
//! - Rebuild itself by replaying every slot in the file (`build_index`)
//! - Keep exactly one entry per key: the slot with the highest version
//! - Remember tombstones whose version must not be reused

mod replay;

use std::collections::hash_map::{self, HashMap};

pub use replay::{build_index, ScanOutcome, ScanReport};

use crate::record::{Key, RecordInfo};

/// Key → authoritative slot
#[derive(Debug, Default, Clone)]
pub struct Index {
    entries: HashMap<Key, RecordInfo>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: Key) -> Option<&RecordInfo> {
        self.entries.get(&key)
    }

    pub fn get_mut(&mut self, key: Key) -> Option<&mut RecordInfo> {
        self.entries.get_mut(&key)
    }

    pub fn insert(&mut self, key: Key, info: RecordInfo) -> Option<RecordInfo> {
        self.entries.insert(key, info)
    }

    pub fn remove(&mut self, key: Key) -> Option<RecordInfo> {
        self.entries.remove(&key)
    }

    /// Feed slots in file order; keeps the authoritative one per key.
    ///
    /// A higher version always wins. On equal versions the later slot wins:
    /// a version is only ever reused after a version-0 record was deleted
    /// and forgotten, and the re-insert is appended after the tombstone.
    ///
    /// Returns true if the index changed.
    pub fn observe(&mut self, key: Key, info: RecordInfo) -> bool {
        match self.entries.entry(key) {
            hash_map::Entry::Vacant(slot) => {
                slot.insert(info);
                true
            }
            hash_map::Entry::Occupied(mut slot) => {
                if info.version >= slot.get().version {
                    slot.insert(info);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Number of entries, tombstones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of live (non-tombstone) entries
    pub fn live_count(&self) -> usize {
        self.entries.values().filter(|info| info.is_valid()).count()
    }

    /// All entries, tombstones included, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (Key, &RecordInfo)> + '_ {
        self.entries.iter().map(|(key, info)| (*key, info))
    }

    /// Live entries only, in no particular order
    pub fn live(&self) -> impl Iterator<Item = (Key, &RecordInfo)> + '_ {
        self.iter().filter(|(_, info)| info.is_valid())
    }
}
