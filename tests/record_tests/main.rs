//! Tests for the record codec, capacity policies and format constants

#[path = "../common/mod.rs"]
mod common;

mod capacity_tests;
mod format_tests;
