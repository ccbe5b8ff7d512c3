//! Command execution layer for tracelab
//!
//! - [`LabConfig`]: settings, loaded from TOML
//! - [`JobTracker`]: background query execution with pollable jobs
//! - [`Command`] / [`Output`]: every operation as plain data
//! - [`Executor`]: routes commands to their handlers
//! - [`TraceLab`]: typed wrapper over the executor
//!
//! The executor and tracker start worker tasks and must be created inside
//! a Tokio runtime.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod command;
pub mod config;
mod executor;
mod handlers;
pub mod jobs;
mod lab;
mod output;

#[cfg(test)]
mod tests;

pub use command::Command;
pub use config::LabConfig;
pub use executor::Executor;
pub use jobs::{JobContext, JobTracker};
pub use lab::{TraceLab, TraceLabBuilder};
pub use output::{JobView, Output, QueryInfo};
pub use tracelab_core::{Error, Result};
