//! Tests for the Store lifecycle
//!
//! These tests verify:
//! - Scanning → Scanned → Writable transitions
//! - `get` only works while the file view is held
//! - `fetch` works in every state
//! - Create/clear and open error paths

use std::fs;

use slotkv::format::GLOBAL_HEADER_SIZE;
use slotkv::{Config, Key, SlotError, Store, StoreState};

use crate::common::setup_temp_path;

// =============================================================================
// Create / Open Tests
// =============================================================================

#[test]
fn test_create_writes_only_global_header() {
    let (_temp, path) = setup_temp_path();

    let store = Store::create(&path, Config::default()).unwrap();

    assert_eq!(store.state(), StoreState::Scanned);
    assert_eq!(store.record_count(), 0);
    assert_eq!(store.append_offset(), GLOBAL_HEADER_SIZE);
    assert_eq!(fs::metadata(&path).unwrap().len(), GLOBAL_HEADER_SIZE);
}

#[test]
fn test_create_clears_existing_store() {
    let (_temp, path) = setup_temp_path();

    let mut store = Store::create(&path, Config::default()).unwrap();
    store.upsert(Key(1), b"data").unwrap();
    store.close().unwrap();

    let store = Store::create(&path, Config::default()).unwrap();
    assert_eq!(store.record_count(), 0);
    drop(store);

    let store = Store::open(&path, Config::default()).unwrap();
    assert_eq!(store.record_count(), 0);
}

#[test]
fn test_make_or_clear_then_open() {
    let (_temp, path) = setup_temp_path();
    fs::write(&path, b"garbage that is not a store").unwrap();

    Store::make_or_clear(&path).unwrap();
    let store = Store::open(&path, Config::default()).unwrap();

    assert_eq!(store.state(), StoreState::Scanning);
    assert_eq!(store.record_count(), 0);
    assert_eq!(store.next_key(), Some(Key(0)));
}

#[test]
fn test_open_missing_file_is_io_error() {
    let (_temp, path) = setup_temp_path();

    let result = Store::open(&path, Config::default());
    assert!(matches!(result, Err(SlotError::Io(_))));
}

#[test]
fn test_open_bad_file_names_path() {
    let (_temp, path) = setup_temp_path();
    fs::write(&path, [0u8; 16]).unwrap();

    match Store::open(&path, Config::default()) {
        Err(SlotError::Format(msg)) => {
            assert!(msg.contains("magic"), "unexpected message: {}", msg);
            assert!(msg.contains("test.db"), "path missing from: {}", msg);
        }
        Err(other) => panic!("expected format error, got {:?}", other),
        Ok(_) => panic!("expected format error"),
    }
}

// =============================================================================
// State Transition Tests
// =============================================================================

#[test]
fn test_state_transitions() {
    let (_temp, path) = setup_temp_path();
    Store::make_or_clear(&path).unwrap();

    let mut store = Store::open(&path, Config::default()).unwrap();
    assert_eq!(store.state(), StoreState::Scanning);

    store.finish_scan();
    assert_eq!(store.state(), StoreState::Scanned);

    store.upsert(Key(1), b"x").unwrap();
    assert_eq!(store.state(), StoreState::Writable);
}

#[test]
fn test_first_write_releases_view() {
    let (_temp, path) = setup_temp_path();
    Store::make_or_clear(&path).unwrap();

    let mut store = Store::open(&path, Config::default()).unwrap();
    store.upsert(Key(1), b"x").unwrap();

    assert_eq!(store.state(), StoreState::Writable);
    assert!(matches!(store.get(Key(1)), Err(SlotError::InvalidState(_))));
}

#[test]
fn test_delete_of_unknown_key_opens_nothing() {
    let (_temp, path) = setup_temp_path();
    Store::make_or_clear(&path).unwrap();

    let mut store = Store::open(&path, Config::default()).unwrap();
    store.delete(Key(5)).unwrap();

    assert_eq!(store.state(), StoreState::Scanning);
}

#[test]
fn test_get_after_finish_scan_is_invalid_state() {
    let (_temp, path) = setup_temp_path();
    Store::make_or_clear(&path).unwrap();

    let mut store = Store::open(&path, Config::default()).unwrap();
    store.finish_scan();

    assert!(matches!(store.get(Key(1)), Err(SlotError::InvalidState(_))));
}

// =============================================================================
// Fetch Tests
// =============================================================================

#[test]
fn test_fetch_in_every_state() {
    let (_temp, path) = setup_temp_path();

    let mut store = Store::create(&path, Config::default()).unwrap();
    store.upsert(Key(1), b"hello").unwrap();
    store.upsert(Key(2), &[9u8; 300]).unwrap();

    // Writable: reads through the write handle
    assert_eq!(store.fetch(Key(1)).unwrap(), Some(b"hello".to_vec()));
    assert_eq!(store.fetch(Key(2)).unwrap(), Some(vec![9u8; 300]));
    store.close().unwrap();

    // Scanning: served from the file view
    let mut store = Store::open(&path, Config::default()).unwrap();
    assert_eq!(store.fetch(Key(1)).unwrap(), Some(b"hello".to_vec()));

    // Scanned: fresh read from disk
    store.finish_scan();
    assert_eq!(store.fetch(Key(2)).unwrap(), Some(vec![9u8; 300]));
    assert_eq!(store.fetch(Key(3)).unwrap(), None);
}

#[test]
fn test_fetch_deleted_key() {
    let (_temp, path) = setup_temp_path();

    let mut store = Store::create(&path, Config::default()).unwrap();
    store.upsert(Key(1), b"hello").unwrap();
    store.delete(Key(1)).unwrap();

    assert_eq!(store.fetch(Key(1)).unwrap(), None);
}

// =============================================================================
// Flush Tests
// =============================================================================

#[test]
fn test_flush_without_writer_is_noop() {
    let (_temp, path) = setup_temp_path();

    let mut store = Store::create(&path, Config::default()).unwrap();
    store.flush().unwrap();
    assert_eq!(store.state(), StoreState::Scanned);
}

#[test]
fn test_flush_then_read_back_from_second_handle() {
    let (_temp, path) = setup_temp_path();

    let mut store = Store::create(&path, Config::default()).unwrap();
    store.upsert(Key(10), b"durable").unwrap();
    store.flush().unwrap();

    // The writer stays open; a separate scan sees the flushed slot.
    let other = Store::open(&path, Config::default()).unwrap();
    assert_eq!(&other.get(Key(10)).unwrap().unwrap()[..], b"durable");
}
