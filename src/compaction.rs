//! Compaction
//!
//! Rewrites only the live records into a fresh file and atomically swaps it
//! in for the original. Superseded slots and tombstones are dropped and every
//! surviving record restarts at version 0 with the capacity the configured
//! policy picks for its current length.
//!
//! The original file is never modified: if the process dies before the
//! final rename, the temp file is simply left behind.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Result, SlotError};
use crate::format::{self, RECORD_HEADER_SIZE};
use crate::io::replace_file;
use crate::record::{checked_capacity, RecordHeader};
use crate::store::Store;

/// Outcome of a compaction run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactionStats {
    /// Live records copied into the new file
    pub records_written: u64,
    /// File size before compaction
    pub bytes_before: u64,
    /// File size after compaction
    pub bytes_after: u64,
}

impl CompactionStats {
    /// Bytes freed, or zero if the new policy made the file larger
    pub fn bytes_reclaimed(&self) -> u64 {
        self.bytes_before.saturating_sub(self.bytes_after)
    }
}

/// Compact the store file at `path`.
///
/// Must not be called while a `Store` has this file open for writing.
pub fn compact(path: impl AsRef<Path>, config: &Config) -> Result<CompactionStats> {
    let path = path.as_ref();
    let temp_path = temp_path_for(path, &config.temp_suffix);

    match rewrite_live_records(path, &temp_path, config) {
        Ok((records_written, bytes_before)) => {
            replace_file(&temp_path, path)?;
            let bytes_after = fs::metadata(path)?.len();

            let stats = CompactionStats {
                records_written,
                bytes_before,
                bytes_after,
            };
            info!(
                path = %path.display(),
                records = stats.records_written,
                before = stats.bytes_before,
                after = stats.bytes_after,
                "Compaction complete"
            );
            Ok(stats)
        }
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    warn!(path = %temp_path.display(), "Failed to remove compaction temp file: {}", cleanup);
                }
            }
            Err(e)
        }
    }
}

/// Path of the temp file compaction writes into
pub fn temp_path_for(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Write the live records of `path` into `temp_path`.
///
/// Returns the number of records written and the original file size.
fn rewrite_live_records(path: &Path, temp_path: &Path, config: &Config) -> Result<(u64, u64)> {
    // Step 1: Scan the original to get the authoritative slot per key
    let store = Store::open(path, config.clone())?;
    let bytes_before = fs::metadata(path)?.len();

    // Step 2: Start the new file with the global header
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(temp_path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&format::encode_global_header())?;

    // Step 3: Copy every live record into a fresh version-0 slot.
    // Ordered by old offset so records keep their relative placement.
    let mut records: Vec<_> = store.records().collect();
    records.sort_by_key(|(_, info)| info.offset);

    for (key, info) in &records {
        let data = store.get(*key)?.ok_or_else(|| {
            SlotError::InvalidState(format!("record {} vanished during compaction", key))
        })?;

        let capacity = checked_capacity(
            config.capacity_policy.as_ref(),
            info.len,
            config.max_record_capacity,
        )?;
        let header = RecordHeader::new(*key, info.len, capacity, 0);

        writer.write_all(&header.encode())?;
        writer.write_all(&data)?;

        let fill = format::slot_footprint(capacity) - RECORD_HEADER_SIZE as u64 - info.len as u64;
        io::copy(&mut io::repeat(0).take(fill), &mut writer)?;
    }

    // Step 4: Make the new file durable before it can replace the old one
    let file: File = writer
        .into_inner()
        .map_err(|e| SlotError::Io(e.into_error()))?;
    file.sync_all()?;

    debug!(
        temp = %temp_path.display(),
        records = records.len(),
        dropped_slots = store.scan_report().slots_scanned - records.len() as u64,
        "Wrote compacted file"
    );

    Ok((records.len() as u64, bytes_before))
}
