//! Engine adapters for tracelab
//!
//! This crate wraps the external tools the service depends on:
//! - [`TraceArtifacts`]: where trace files live, and their content digests
//! - [`QueryRunner`]: the contract for executing SQL against a trace
//! - [`TraceProcessorShell`]: the `trace_processor_shell` implementation
//! - [`DeviceBridge`] / [`AdbBridge`]: device discovery and trace capture
//!
//! Every subprocess runs under a deadline; see [`process`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod artifacts;
pub mod capture;
pub mod process;
pub mod runner;
pub mod shell;

pub use artifacts::TraceArtifacts;
pub use capture::{capture_trace, parse_device_list, AdbBridge, DeviceBridge};
pub use runner::QueryRunner;
pub use shell::TraceProcessorShell;
