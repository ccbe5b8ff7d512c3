//! Convenient imports for tracelab.
//!
//! ```ignore
//! use tracelab::prelude::*;
//!
//! let lab = TraceLab::builder().data_dir("./lab").open()?;
//! ```

// Main entry point
pub use tracelab_executor::{LabConfig, TraceLab, TraceLabBuilder};

// Error handling
pub use tracelab_core::{Error, Result};

// Core types
pub use tracelab_core::{Job, JobKey, JobStatus, QueryId, QueryTable, Scalar, TraceId};
pub use tracelab_executor::{JobView, QueryInfo};

// Collaborator seams
pub use tracelab_engine::{DeviceBridge, QueryRunner};

pub use std::time::Duration;
