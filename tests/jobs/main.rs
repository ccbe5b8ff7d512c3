//! Job Integration Tests
//!
//! Tests for the job tracker through the public lab API: lifecycle,
//! result caching, failure recording and concurrent jobs.

#[path = "../common/mod.rs"]
mod common;

mod caching;
mod concurrency;
mod lifecycle;
mod slow_frames;
