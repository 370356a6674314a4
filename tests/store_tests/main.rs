//! Tests for Store

#[path = "../common/mod.rs"]
mod common;

mod lifecycle_tests;
