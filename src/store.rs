//! Store Module
//!
//! The record store: one file, one in-memory index, one writer.
//!
//! ## Lifecycle
//! ```text
//!   Store::open ──► Scanning ──finish_scan()──► Scanned ──first write──► Writable
//!                      │                           ▲
//!                      └────── first write ────────┼──────────────────────►
//!   Store::create ─────────────────────────────────┘
//! ```
//!
//! - **Scanning**: the whole file is held in memory; `get` hands out
//!   zero-copy payload views.
//! - **Scanned**: the view is released; the index and append point remain.
//! - **Writable**: a read/write handle is open. The first mutation releases
//!   any held view, since it would go stale.
//!
//! ## Write Policy
//! - Payload fits the key's current slot: overwrite in place, same version.
//! - Payload does not fit: append a new slot with `version + 1`.
//! - New key: append a new slot with version 0.
//! - Delete: rewrite the header with the tombstone length. Version-0 keys
//!   are forgotten; higher versions stay indexed so a re-insert gets a
//!   version above every stale slot still in the file.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::{debug, info, trace};

use crate::config::Config;
use crate::error::{Result, SlotError};
use crate::format::{self, GLOBAL_HEADER_SIZE, MAX_PAYLOAD_LEN, RECORD_HEADER_SIZE, TOMBSTONE_LEN};
use crate::index::{build_index, Index, ScanReport};
use crate::io::{LogReader, LogWriter};
use crate::record::{checked_capacity, Key, RecordHeader, RecordInfo};

/// Where a store is in its scan-then-mutate lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// File view held, index built
    Scanning,
    /// No handles open, index built
    Scanned,
    /// Write handle open
    Writable,
}

/// Single-file, single-writer record store
pub struct Store {
    /// Path of the store file
    path: PathBuf,

    /// Store configuration
    config: Config,

    /// In-memory copy of the file, present while scanning
    view: Option<LogReader>,

    /// Read/write handle, opened on first mutation
    writer: Option<LogWriter>,

    /// Key → authoritative slot
    index: Index,

    /// Offset where the next new slot goes
    append_offset: u64,

    /// Next key `allocate_key` hands out; `None` once exhausted
    next_key: Option<u64>,

    /// Torn tail to cut off before the first write
    pending_truncate: Option<u64>,

    /// Summary of the scan this store was opened with
    report: ScanReport,

    /// Reused slot encoding buffer
    scratch: Vec<u8>,
}

impl Store {
    // =========================================================================
    // Opening
    // =========================================================================

    /// Create or truncate `path`, leaving only the global header.
    pub fn make_or_clear(path: &Path) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        file.write_all(&format::encode_global_header())?;
        file.sync_all()?;
        Ok(())
    }

    /// Create an empty store at `path`, discarding any previous contents.
    ///
    /// The returned store is in the `Scanned` state.
    pub fn create(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        let path = path.as_ref();
        Self::make_or_clear(path)?;

        info!(path = %path.display(), "Created empty store");

        let report = ScanReport {
            append_offset: GLOBAL_HEADER_SIZE,
            next_key: Some(0),
            ..ScanReport::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            config,
            view: None,
            writer: None,
            index: Index::new(),
            append_offset: GLOBAL_HEADER_SIZE,
            next_key: Some(0),
            pending_truncate: None,
            report,
            scratch: Vec::new(),
        })
    }

    /// Open an existing store and rebuild its index.
    ///
    /// The returned store is in the `Scanning` state: payloads can be read
    /// with `get` until `finish_scan` or the first mutation.
    pub fn open(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        let path = path.as_ref();

        let mut reader = LogReader::open(path)?;
        let outcome = build_index(&mut reader, &config).map_err(|e| e.in_file(path))?;
        let report = outcome.report;

        info!(
            path = %path.display(),
            records = report.live_records,
            slots = report.slots_scanned,
            bytes = reader.len(),
            "Opened store"
        );

        Ok(Self {
            path: path.to_path_buf(),
            config,
            view: Some(reader),
            writer: None,
            index: outcome.index,
            append_offset: report.append_offset,
            next_key: report.next_key,
            pending_truncate: report.torn_tail_at,
            report,
            scratch: Vec::new(),
        })
    }

    /// Release the in-memory file view. Index and append point are kept.
    pub fn finish_scan(&mut self) {
        if self.view.take().is_some() {
            debug!(path = %self.path.display(), "Released file view");
        }
    }

    // =========================================================================
    // Key Allocation
    // =========================================================================

    /// Hand out a key never seen in this file.
    pub fn allocate_key(&mut self) -> Result<Key> {
        let key = self.next_key.ok_or(SlotError::KeySpaceExhausted)?;
        self.next_key = key.checked_add(1);
        Ok(Key(key))
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Insert or replace the payload stored under `key`.
    ///
    /// Nothing is touched on disk until the payload has been validated and
    /// the target slot chosen. With `SyncStrategy::EveryWrite`, an error from
    /// the trailing sync means the slot was written and indexed but may not
    /// be durable yet.
    pub fn upsert(&mut self, key: Key, data: &[u8]) -> Result<()> {
        // Step 1: Validate size (sentinel and one value below it are reserved)
        if data.len() > MAX_PAYLOAD_LEN as usize {
            return Err(SlotError::InvalidArgument(format!(
                "data too large: {} bytes (max {})",
                data.len(),
                MAX_PAYLOAD_LEN
            )));
        }
        if let Some(limit) = self.config.max_record_capacity {
            if data.len() > limit as usize {
                return Err(SlotError::InvalidArgument(format!(
                    "data too large: {} bytes exceeds the record capacity limit of {}",
                    data.len(),
                    limit
                )));
            }
        }
        let len = data.len() as u32;

        // Step 2: Pick the slot before opening the write handle
        let existing = self.index.get(key).copied();
        let placement = match existing {
            Some(info) if info.capacity >= len => Placement::InPlace(info),
            Some(info) => {
                let version = info.version.checked_add(1).ok_or_else(|| {
                    SlotError::InvalidState(format!("version counter for key {} exhausted", key))
                })?;
                Placement::Append {
                    capacity: self.capacity_for(len)?,
                    version,
                }
            }
            None => Placement::Append {
                capacity: self.capacity_for(len)?,
                version: 0,
            },
        };

        // Step 3: Write the slot and update the index
        match placement {
            Placement::InPlace(info) => {
                let header = RecordHeader::new(key, len, info.capacity, info.version);
                self.write_slot(info.offset, header, data, false)?;

                if let Some(entry) = self.index.get_mut(key) {
                    entry.len = len;
                }
                trace!(key = %key, offset = info.offset, len, "Updated record in place");
            }
            Placement::Append { capacity, version } => {
                let new_info = self.append_slot(key, capacity, version, data)?;
                self.index.insert(key, new_info);

                match existing {
                    Some(old) => debug!(
                        key = %key,
                        from = old.offset,
                        to = new_info.offset,
                        capacity,
                        version,
                        "Relocated record"
                    ),
                    None => trace!(key = %key, offset = new_info.offset, len, "Inserted record"),
                }
            }
        }

        // Step 4: Keep the allocator ahead of caller-supplied keys
        if let Some(next) = self.next_key {
            if key.0 >= next {
                self.next_key = key.0.checked_add(1);
            }
        }

        // Step 5: Sync once the index matches the file
        self.writer()?.sync_after_write()
    }

    /// Mark the record under `key` as deleted.
    ///
    /// Unknown and already-deleted keys are a no-op.
    pub fn delete(&mut self, key: Key) -> Result<()> {
        let info = match self.index.get(key).copied() {
            Some(info) if info.is_valid() => info,
            _ => return Ok(()),
        };

        // Capacity stays so the slot can still be skipped over during a scan.
        let header = RecordHeader::tombstone(key, info.capacity, info.version);
        self.write_slot(info.offset, header, &[], false)?;

        if info.version == 0 {
            // Version 0 means this is the only slot the key ever had.
            self.index.remove(key);
        } else if let Some(entry) = self.index.get_mut(key) {
            entry.len = TOMBSTONE_LEN;
        }

        trace!(key = %key, offset = info.offset, version = info.version, "Deleted record");
        self.writer()?.sync_after_write()
    }

    /// Force written slots to durable storage.
    pub fn flush(&mut self) -> Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.sync(),
            None => Ok(()),
        }
    }

    /// Flush and close the store.
    pub fn close(mut self) -> Result<()> {
        self.flush()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Number of live records
    pub fn record_count(&self) -> usize {
        self.index.live_count()
    }

    /// Live records and their slots, in no particular order
    pub fn records(&self) -> impl Iterator<Item = (Key, RecordInfo)> + '_ {
        self.index.live().map(|(key, info)| (key, *info))
    }

    /// True if `key` holds a live record
    pub fn contains(&self, key: Key) -> bool {
        self.index.get(key).map_or(false, RecordInfo::is_valid)
    }

    /// Index entry for `key`, tombstones included
    pub fn record_info(&self, key: Key) -> Option<RecordInfo> {
        self.index.get(key).copied()
    }

    /// Zero-copy view of the payload under `key`.
    ///
    /// Only available while scanning; returns `Ok(None)` for unknown or
    /// deleted keys.
    pub fn get(&self, key: Key) -> Result<Option<Bytes>> {
        let view = self.view.as_ref().ok_or_else(|| {
            SlotError::InvalidState(
                "get needs the file view; use fetch after finish_scan or a write".to_string(),
            )
        })?;

        let info = match self.index.get(key) {
            Some(info) if info.is_valid() => info,
            _ => return Ok(None),
        };

        view.slice(info.payload_offset(), info.len as u64)
            .map(Some)
            .ok_or_else(|| {
                SlotError::Format(format!(
                    "record {} at offset {} runs past end of file",
                    key, info.offset
                ))
            })
    }

    /// Read the payload under `key` from disk, in any state.
    pub fn fetch(&mut self, key: Key) -> Result<Option<Vec<u8>>> {
        let info = match self.index.get(key) {
            Some(info) if info.is_valid() => *info,
            _ => return Ok(None),
        };

        if self.view.is_some() {
            return Ok(self.get(key)?.map(|bytes| bytes.to_vec()));
        }

        let mut buf = vec![0u8; info.len as usize];
        match self.writer.as_mut() {
            Some(writer) => writer.read_at(info.payload_offset(), &mut buf)?,
            None => {
                let mut file = File::open(&self.path)?;
                file.seek(SeekFrom::Start(info.payload_offset()))?;
                file.read_exact(&mut buf)?;
            }
        }
        Ok(Some(buf))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> StoreState {
        if self.writer.is_some() {
            StoreState::Writable
        } else if self.view.is_some() {
            StoreState::Scanning
        } else {
            StoreState::Scanned
        }
    }

    /// The full index, tombstones included
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Offset where the next new slot will be written
    pub fn append_offset(&self) -> u64 {
        self.append_offset
    }

    /// Key the allocator will hand out next
    pub fn next_key(&self) -> Option<Key> {
        self.next_key.map(Key)
    }

    /// Summary of the scan this store was opened with
    pub fn scan_report(&self) -> &ScanReport {
        &self.report
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Open the write handle on first use.
    fn writer(&mut self) -> Result<&mut LogWriter> {
        if self.writer.is_none() {
            if self.view.take().is_some() {
                debug!(path = %self.path.display(), "Released file view for writing");
            }

            let mut writer = LogWriter::open(&self.path, self.config.sync_strategy)?;
            if let Some(len) = self.pending_truncate.take() {
                let was = writer.file_len()?;
                writer.truncate(len)?;
                info!(
                    path = %self.path.display(),
                    from = was,
                    to = len,
                    "Truncated torn tail"
                );
            }
            self.writer = Some(writer);
        }

        self.writer
            .as_mut()
            .ok_or_else(|| SlotError::InvalidState("write handle unavailable".to_string()))
    }

    /// Capacity for a new slot holding `len` bytes, per the configured policy
    fn capacity_for(&self, len: u32) -> Result<u32> {
        checked_capacity(
            self.config.capacity_policy.as_ref(),
            len,
            self.config.max_record_capacity,
        )
    }

    /// Write a brand-new slot at the append point and advance it.
    fn append_slot(&mut self, key: Key, capacity: u32, version: u32, data: &[u8]) -> Result<RecordInfo> {
        let len = data.len() as u32;
        let info = RecordInfo {
            offset: self.append_offset,
            len,
            capacity,
            version,
        };
        self.write_slot(info.offset, RecordHeader::new(key, len, capacity, version), data, true)?;

        // Only advance once the slot is on disk; a gap would replay as garbage.
        self.append_offset += info.footprint();
        Ok(info)
    }

    /// Encode header + payload and write them with a single seek + write.
    ///
    /// With `fill` set, the unused capacity and alignment padding are
    /// zero-filled as well.
    fn write_slot(&mut self, offset: u64, header: RecordHeader, data: &[u8], fill: bool) -> Result<()> {
        let mut buf = std::mem::take(&mut self.scratch);
        buf.clear();
        buf.resize(RECORD_HEADER_SIZE, 0);
        header.encode_into(&mut buf);
        buf.extend_from_slice(data);
        if fill {
            buf.resize(format::slot_footprint(header.capacity) as usize, 0);
        }

        let result = self.writer().and_then(|writer| writer.write_at(offset, &buf));
        self.scratch = buf;
        result
    }
}

/// Where an upsert puts its payload
#[derive(Debug, Clone, Copy)]
enum Placement {
    /// Overwrite the key's current slot, keeping capacity and version
    InPlace(RecordInfo),
    /// Append a new slot at the end of the file
    Append { capacity: u32, version: u32 },
}
