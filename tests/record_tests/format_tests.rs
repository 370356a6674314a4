//! Tests for the global header and alignment helpers

use slotkv::format::{
    self, align_up, slot_footprint, FORMAT_VERSION, GLOBAL_HEADER_SIZE, MAGIC, MAX_PAYLOAD_LEN,
    TOMBSTONE_LEN,
};
use slotkv::SlotError;

#[test]
fn test_global_header_layout() {
    let header = format::encode_global_header();

    assert_eq!(header.len() as u64, GLOBAL_HEADER_SIZE);
    assert_eq!(&header[0..4], &MAGIC.to_ne_bytes());
    assert_eq!(&header[4..8], &FORMAT_VERSION.to_ne_bytes());
    assert!(format::check_global_header(&header).is_ok());
}

#[test]
fn test_bad_magic_rejected() {
    let mut header = format::encode_global_header();
    header[0] ^= 0xFF;

    let err = format::check_global_header(&header).unwrap_err();
    assert!(matches!(err, SlotError::Format(ref msg) if msg.contains("magic")));
}

#[test]
fn test_unsupported_version_rejected() {
    let mut header = format::encode_global_header();
    header[4..8].copy_from_slice(&2u32.to_ne_bytes());

    let err = format::check_global_header(&header).unwrap_err();
    assert!(matches!(err, SlotError::Format(ref msg) if msg.contains("version")));
}

#[test]
fn test_align_up() {
    assert_eq!(align_up(0, 4), 0);
    assert_eq!(align_up(1, 4), 4);
    assert_eq!(align_up(4, 4), 4);
    assert_eq!(align_up(23, 4), 24);
    assert_eq!(align_up(23, 8), 24);
}

#[test]
fn test_slot_footprint_includes_header_and_padding() {
    assert_eq!(slot_footprint(0), 20);
    assert_eq!(slot_footprint(68), 88);
    assert_eq!(slot_footprint(1), 24);
    assert_eq!(slot_footprint(3), 24);
}

#[test]
fn test_payload_limit_leaves_headroom_below_sentinel() {
    assert_eq!(TOMBSTONE_LEN, u32::MAX);
    assert_eq!(MAX_PAYLOAD_LEN, u32::MAX - 2);
}
