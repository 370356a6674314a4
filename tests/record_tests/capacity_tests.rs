//! Tests for capacity policies

use std::sync::Arc;

use slotkv::format::MAX_PAYLOAD_LEN;
use slotkv::record::{CapacityPolicy, ExactCapacity, PaddedCapacity};

#[test]
fn test_padded_default_adds_slack_and_aligns() {
    let policy = PaddedCapacity::default();

    assert_eq!(policy.capacity_for(0), 64);
    assert_eq!(policy.capacity_for(1), 68);
    assert_eq!(policy.capacity_for(3), 68);
    assert_eq!(policy.capacity_for(4), 68);
    assert_eq!(policy.capacity_for(5), 72);
    assert_eq!(policy.capacity_for(100), 164);
}

#[test]
fn test_padded_custom_alignment() {
    let policy = PaddedCapacity::new(0, 16);

    assert_eq!(policy.capacity_for(0), 0);
    assert_eq!(policy.capacity_for(1), 16);
    assert_eq!(policy.capacity_for(16), 16);
    assert_eq!(policy.capacity_for(17), 32);
}

#[test]
#[should_panic(expected = "power of two")]
fn test_padded_rejects_odd_alignment() {
    let _ = PaddedCapacity::new(8, 3);
}

#[test]
#[should_panic(expected = "power of two")]
fn test_padded_rejects_zero_alignment() {
    let _ = PaddedCapacity::new(8, 0);
}

#[test]
fn test_padded_accessors() {
    let policy = PaddedCapacity::new(8, 16);
    assert_eq!(policy.slack(), 8);
    assert_eq!(policy.alignment(), 16);

    let default = PaddedCapacity::default();
    assert_eq!(default.slack(), 64);
    assert_eq!(default.alignment(), 4);
}

#[test]
fn test_padded_never_reaches_sentinel() {
    let policy = PaddedCapacity::default();

    assert_eq!(policy.capacity_for(MAX_PAYLOAD_LEN), MAX_PAYLOAD_LEN);
    assert!(policy.capacity_for(MAX_PAYLOAD_LEN - 10) >= MAX_PAYLOAD_LEN - 10);
    assert!(policy.capacity_for(MAX_PAYLOAD_LEN - 10) <= MAX_PAYLOAD_LEN);
}

#[test]
fn test_exact_capacity() {
    let policy = ExactCapacity;

    assert_eq!(policy.capacity_for(0), 0);
    assert_eq!(policy.capacity_for(7), 7);
}

#[test]
fn test_policies_as_trait_objects() {
    let policies: Vec<Arc<dyn CapacityPolicy>> =
        vec![Arc::new(PaddedCapacity::default()), Arc::new(ExactCapacity)];

    for policy in policies {
        for len in [0u32, 1, 63, 64, 1000] {
            assert!(policy.capacity_for(len) >= len, "{:?} shrank {}", policy, len);
        }
    }
}
