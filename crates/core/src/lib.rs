//! Core types for tracelab
//!
//! This crate defines the vocabulary shared by every layer:
//! - [`TraceId`], [`QueryId`], [`JobKey`]: identifiers
//! - [`TraceDigest`], [`Fingerprint`]: content-addressed cache keys
//! - [`Scalar`], [`QueryTable`]: rectangular query results
//! - [`NamedQuery`]: user-defined and predefined queries
//! - [`Job`], [`JobStatus`]: asynchronous execution state
//! - [`Error`]: the error taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod fingerprint;
pub mod job;
pub mod query;
pub mod table;
pub mod types;

pub use error::{Error, Result};
pub use fingerprint::{Fingerprint, TraceDigest};
pub use job::{Job, JobStatus};
pub use query::{normalize_query_id, predefined_queries, NamedQuery, PredefinedQuery};
pub use table::{QueryTable, Scalar};
pub use types::{JobKey, QueryId, TraceId};
