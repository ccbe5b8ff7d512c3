//! Persistent stores for tracelab
//!
//! This crate implements the two durable stores:
//! - [`QueryStore`]: custom named queries merged over the predefined set
//! - [`ResultCache`]: query results keyed by content fingerprint
//!
//! Both persist as a single JSON document through [`JsonDocument`], which
//! serializes load-mutate-save cycles and replaces the file atomically.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod query_store;
pub mod result_cache;

pub use document::JsonDocument;
pub use query_store::{QueryEntry, QueryStore};
pub use result_cache::{CacheEntry, ResultCache};
