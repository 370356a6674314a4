//! Index rebuild by log replay
//!
//! Walks every slot from the first byte after the global header to the end
//! of the file. For each key the slot with the greatest version wins (the
//! later one on a tie), whether it is live or a tombstone; a winning
//! tombstone shadows older live slots that are still physically present.

use tracing::{debug, warn};

use crate::config::{Config, RecoveryMode};
use crate::error::{Result, SlotError};
use crate::format::{self, GLOBAL_HEADER_SIZE, RECORD_HEADER_SIZE, SLOT_ALIGNMENT};
use crate::io::LogReader;
use crate::record::{RecordHeader, RecordInfo};

use super::Index;

/// Summary of one scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Physical slots read, garbage included
    pub slots_scanned: u64,
    /// Keys whose authoritative slot is live
    pub live_records: u64,
    /// Keys whose authoritative slot is a tombstone
    pub tombstones: u64,
    /// Slots shadowed by a higher version of the same key
    pub superseded_slots: u64,
    /// Where the next new slot will be written
    pub append_offset: u64,
    /// First key the allocator will hand out, `None` if exhausted
    pub next_key: Option<u64>,
    /// Offset of a torn slot that ended the scan early
    pub torn_tail_at: Option<u64>,
}

/// Index plus the scan summary
#[derive(Debug)]
pub struct ScanOutcome {
    pub index: Index,
    pub report: ScanReport,
}

/// Replay the whole file held by `reader` into a fresh index.
pub fn build_index(reader: &mut LogReader, config: &Config) -> Result<ScanOutcome> {
    reader.seek(0);
    if !reader.can_read(GLOBAL_HEADER_SIZE) {
        return Err(SlotError::Format(format!(
            "file is {} bytes, too short for the global header",
            reader.len()
        )));
    }
    format::check_global_header(&reader.read_array::<{ GLOBAL_HEADER_SIZE as usize }>()?)?;

    let mut index = Index::new();
    let mut report = ScanReport::default();
    let mut max_key: Option<u64> = None;

    while !reader.at_end() {
        let slot_offset = reader.position();

        if !reader.can_read(RECORD_HEADER_SIZE as u64) {
            let msg = format!(
                "truncated slot header at offset {} ({} bytes left)",
                slot_offset,
                reader.remaining()
            );
            if tolerate_torn_tail(config, slot_offset, &msg, &mut report) {
                break;
            }
            return Err(SlotError::Format(msg));
        }

        let header = RecordHeader::decode(&reader.read_array::<RECORD_HEADER_SIZE>()?);

        if let Some(limit) = config.max_record_capacity {
            if header.capacity > limit {
                return Err(SlotError::Format(format!(
                    "slot at offset {} has capacity {} above the limit of {}",
                    slot_offset, header.capacity, limit
                )));
            }
        }

        if !reader.can_read(header.capacity as u64) {
            let msg = format!(
                "slot at offset {} has capacity {}, went past end of file",
                slot_offset, header.capacity
            );
            if tolerate_torn_tail(config, slot_offset, &msg, &mut report) {
                break;
            }
            return Err(SlotError::Format(msg));
        }

        if !header.is_tombstone() && header.len > header.capacity {
            return Err(SlotError::Format(format!(
                "slot at offset {} has length {} greater than capacity {}",
                slot_offset, header.len, header.capacity
            )));
        }

        let payload_end = reader.position() + header.capacity as u64;
        reader.seek(format::align_up(payload_end, SLOT_ALIGNMENT));

        index.observe(
            header.key,
            RecordInfo {
                offset: slot_offset,
                len: header.len,
                capacity: header.capacity,
                version: header.version,
            },
        );

        report.slots_scanned += 1;
        max_key = Some(max_key.map_or(header.key.0, |m| m.max(header.key.0)));
    }

    report.append_offset = match report.torn_tail_at {
        Some(offset) => offset,
        None => reader.position(),
    };
    report.next_key = match max_key {
        Some(max) => max.checked_add(1),
        None => Some(0),
    };
    report.live_records = index.live_count() as u64;
    report.tombstones = index.len() as u64 - report.live_records;
    report.superseded_slots = report.slots_scanned - index.len() as u64;

    debug!(
        slots = report.slots_scanned,
        live = report.live_records,
        tombstones = report.tombstones,
        superseded = report.superseded_slots,
        append_offset = report.append_offset,
        "Index rebuilt"
    );

    Ok(ScanOutcome { index, report })
}

/// Record a torn tail and report whether the scan may stop here.
fn tolerate_torn_tail(config: &Config, offset: u64, msg: &str, report: &mut ScanReport) -> bool {
    if config.recovery_mode != RecoveryMode::TolerateTornTail {
        return false;
    }
    warn!(offset, "Torn slot at end of file, ignoring tail: {}", msg);
    report.torn_tail_at = Some(offset);
    true
}

