//! # slotkv
//!
//! An embedded, single-file, log-structured record store with:
//! - 64-bit keys mapped to opaque byte payloads
//! - In-place overwrites when the new payload fits the existing slot
//! - Versioned relocation when it does not, and tombstone deletes
//! - Index rebuild by replaying the file on open
//! - Offline compaction with an atomic file swap
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Store                              │
//! │        (upsert / delete / get / allocate_key / flush)       │
//! └──────────┬──────────────────┬──────────────────┬────────────┘
//!            │                  │                  │
//!            ▼                  ▼                  ▼
//!   ┌─────────────────┐ ┌───────────────┐ ┌─────────────────┐
//!   │      Index      │ │  Record Codec │ │   Compactor     │
//!   │ (replay on open)│ │ (20B header)  │ │ (rewrite+swap)  │
//!   └────────┬────────┘ └───────────────┘ └────────┬────────┘
//!            │                                     │
//!            ▼                                     ▼
//!   ┌─────────────────────────────────────────────────────────┐
//!   │            LogReader / LogWriter / replace_file         │
//!   └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use slotkv::{Config, Key, Store};
//!
//! # fn main() -> slotkv::Result<()> {
//! let mut store = Store::create("records.db", Config::default())?;
//! store.upsert(Key(123), &[1, 2, 3])?;
//! store.close()?;
//!
//! let store = Store::open("records.db", Config::default())?;
//! assert_eq!(store.get(Key(123))?.as_deref(), Some(&[1u8, 2, 3][..]));
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod format;

pub mod record;
pub mod io;
pub mod index;
pub mod store;
pub mod compaction;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use compaction::{compact, CompactionStats};
pub use config::{Config, RecoveryMode, SyncStrategy};
pub use error::{Result, SlotError};
pub use index::ScanReport;
pub use record::{CapacityPolicy, ExactCapacity, Key, PaddedCapacity, RecordInfo};
pub use store::{Store, StoreState};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of slotkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
