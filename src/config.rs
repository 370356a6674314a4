//! Configuration for slotkv
//!
//! Centralized configuration with sensible defaults.

use std::sync::Arc;

use crate::record::{CapacityPolicy, PaddedCapacity};

/// Configuration for a single store file
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Slot Allocation
    // -------------------------------------------------------------------------
    /// Capacity reserved for new slots (on insert, growth and compaction)
    pub capacity_policy: Arc<dyn CapacityPolicy>,

    /// Optional hard ceiling on a single slot's capacity.
    /// Applied to decoded headers and to upsert payloads.
    pub max_record_capacity: Option<u32>,

    // -------------------------------------------------------------------------
    // Durability
    // -------------------------------------------------------------------------
    /// When to fsync the file
    pub sync_strategy: SyncStrategy,

    // -------------------------------------------------------------------------
    // Recovery
    // -------------------------------------------------------------------------
    /// How the scan treats a slot cut off by end-of-file
    pub recovery_mode: RecoveryMode,

    // -------------------------------------------------------------------------
    // Compaction
    // -------------------------------------------------------------------------
    /// Suffix appended to the store path for the compaction temp file
    pub temp_suffix: String,
}

/// Sync strategy: how often to fsync the store file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync only on an explicit `flush()` (fastest)
    OnFlush,

    /// fsync after every upsert/delete (safest, slowest)
    EveryWrite,
}

/// What the scan does with a torn slot at the end of the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryMode {
    /// Any malformed slot makes the whole file unusable
    Strict,

    /// A slot whose header or payload runs past end-of-file ends the scan.
    /// Everything before it is kept and the tail is truncated on first write.
    TolerateTornTail,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity_policy: Arc::new(PaddedCapacity::default()),
            max_record_capacity: None,
            sync_strategy: SyncStrategy::OnFlush,
            recovery_mode: RecoveryMode::Strict,
            temp_suffix: "_temp".to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the capacity growth policy
    pub fn capacity_policy(mut self, policy: impl CapacityPolicy + 'static) -> Self {
        self.config.capacity_policy = Arc::new(policy);
        self
    }

    /// Set a per-slot capacity ceiling (in bytes)
    pub fn max_record_capacity(mut self, limit: u32) -> Self {
        self.config.max_record_capacity = Some(limit);
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Set the recovery mode used when scanning
    pub fn recovery_mode(mut self, mode: RecoveryMode) -> Self {
        self.config.recovery_mode = mode;
        self
    }

    /// Set the compaction temp file suffix
    pub fn temp_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.temp_suffix = suffix.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
