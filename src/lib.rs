//! # tracelab
//!
//! Cached, asynchronous SQL queries over captured performance traces.
//!
//! An operator captures a Perfetto trace from a connected device, then runs
//! named SQL queries against it. Each run is a background job that can be
//! polled; results are cached by a fingerprint of the exact trace bytes and
//! query text, so repeating a query against an unchanged trace never starts
//! the engine again.
//!
//! ## Quick Start
//!
//! ```ignore
//! use tracelab::prelude::*;
//!
//! let lab = TraceLab::builder().data_dir("./lab").open()?;
//! let trace = lab.start_capture("emulator-5554")?;
//! // ... once the capture has finished
//! let query = lab.add_query("Slow Frames", "SELECT * FROM actual_frame_timeline_slice")?;
//! let key = lab.dispatch(trace.as_str(), query.as_str())?;
//! let job = lab.wait(&key, Duration::from_secs(60)).await;
//! ```
//!
//! ## Layers
//!
//! - [`core`]: identifiers, fingerprints, tables, jobs, errors
//! - [`storage`]: query store and result cache
//! - [`engine`]: trace files, `trace_processor_shell`, `adb`
//! - [`executor`]: configuration, job tracker, commands

#![warn(missing_docs)]

pub mod prelude;

pub use tracelab_core as core;
pub use tracelab_engine as engine;
pub use tracelab_executor as executor;
pub use tracelab_storage as storage;

// Re-export main entry points
pub use tracelab_executor::{Command, Executor, LabConfig, Output, TraceLab, TraceLabBuilder};

// Re-export error handling
pub use tracelab_core::{Error, Result};

// Re-export types
pub use tracelab_core::{
    Fingerprint, Job, JobKey, JobStatus, QueryId, QueryTable, Scalar, TraceDigest, TraceId,
};
pub use tracelab_executor::{JobView, QueryInfo};
