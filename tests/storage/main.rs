//! Storage Integration Tests
//!
//! Tests for the query store and result cache as persisted under a data
//! directory: restart survival, corrupt files, concurrent writers.

#[path = "../common/mod.rs"]
mod common;

mod query_store;
mod result_cache;
