//! Named queries
//!
//! A query id is derived from its display name, so saving a query under a
//! name that normalizes to an existing id replaces that query.

use crate::error::{Error, Result};
use crate::types::QueryId;
use serde::{Deserialize, Serialize};

/// Derive a query id from a display name
///
/// Lower-cases ASCII letters, collapses every run of other characters to a
/// single `_`, and strips leading and trailing `_`.
///
/// # Examples
///
/// ```
/// use tracelab_core::normalize_query_id;
///
/// assert_eq!(normalize_query_id("Slow Frames").unwrap().as_str(), "slow_frames");
/// assert_eq!(normalize_query_id("  GPU -- freq ").unwrap().as_str(), "gpu_freq");
/// assert!(normalize_query_id(" ?! ").is_err());
/// ```
pub fn normalize_query_id(name: &str) -> Result<QueryId> {
    let mut id = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !id.is_empty() {
                id.push('_');
            }
            pending_sep = false;
            id.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    if id.is_empty() {
        return Err(Error::Validation(format!(
            "query name {:?} has no usable characters",
            name
        )));
    }
    Ok(QueryId::new(id))
}

/// A user-defined query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedQuery {
    /// Id derived from `name`
    pub id: QueryId,
    /// Display name as entered
    pub name: String,
    /// SQL text passed verbatim to the engine
    pub sql_text: String,
}

impl NamedQuery {
    /// Validate input and derive the id
    pub fn new(name: &str, sql_text: &str) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(Error::Validation("query name must not be empty".into()));
        }
        if sql_text.trim().is_empty() {
            return Err(Error::Validation("query text must not be empty".into()));
        }
        Ok(Self {
            id: normalize_query_id(name)?,
            name: name.trim().to_string(),
            sql_text: sql_text.to_string(),
        })
    }
}

/// A built-in, read-only query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredefinedQuery {
    /// Stable id
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// SQL text
    pub sql: &'static str,
}

const PREDEFINED: &[PredefinedQuery] = &[
    PredefinedQuery {
        id: "cpu_usage_per_core",
        name: "CPU usage per core",
        sql: "SELECT cpu, SUM(dur) as total_duration_ns FROM sched GROUP BY cpu ORDER BY cpu;",
    },
    PredefinedQuery {
        id: "top_10_processes_by_cpu",
        name: "Top 10 processes by CPU",
        sql: "SELECT process.name, SUM(dur) as total_cpu_time_ns FROM sched \
              JOIN thread ON sched.utid = thread.utid \
              JOIN process ON thread.upid = process.upid \
              WHERE process.name IS NOT NULL \
              GROUP BY process.name ORDER BY total_cpu_time_ns DESC LIMIT 10;",
    },
    PredefinedQuery {
        id: "android_janky_frames",
        name: "Android janky frames",
        sql: "SELECT dur as duration_ns, name FROM slice \
              WHERE name LIKE 'Choreographer#doFrame%' AND dur > 16600000 \
              ORDER BY dur DESC LIMIT 20;",
    },
];

/// Built-in queries available on every installation
pub fn predefined_queries() -> &'static [PredefinedQuery] {
    PREDEFINED
}
