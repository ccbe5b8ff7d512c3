//! Identifier types
//!
//! - [`TraceId`]: names a captured trace artifact
//! - [`QueryId`]: names a predefined or custom query
//! - [`JobKey`]: the `(trace, query)` pair a job is tracked under

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a trace artifact
///
/// The identifier doubles as the artifact's file stem, so it must be a
/// single path component. Generated identifiers are UUID v4 strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(String);

impl TraceId {
    /// Create a new random TraceId using UUID v4
    ///
    /// # Examples
    ///
    /// ```
    /// use tracelab_core::TraceId;
    ///
    /// let a = TraceId::new();
    /// let b = TraceId::new();
    /// assert_ne!(a, b);
    /// ```
    pub fn new() -> Self {
        TraceId(Uuid::new_v4().to_string())
    }

    /// Parse a caller-supplied trace identifier
    ///
    /// Rejects empty identifiers and anything that could escape the traces
    /// directory (`/`, `\`, `.` and `..`, NUL).
    ///
    /// # Examples
    ///
    /// ```
    /// use tracelab_core::TraceId;
    ///
    /// assert!(TraceId::parse("abc").is_ok());
    /// assert!(TraceId::parse("../etc/passwd").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::Validation("trace id must not be empty".into()));
        }
        if raw == "." || raw == ".." {
            return Err(Error::Validation(format!("invalid trace id: {}", raw)));
        }
        if raw.contains(['/', '\\', '\0']) {
            return Err(Error::Validation(format!(
                "trace id must be a single path component: {}",
                raw
            )));
        }
        Ok(TraceId(raw.to_string()))
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a named query
///
/// Custom query ids are derived from the query name with
/// [`normalize_query_id`](crate::normalize_query_id). Lookups accept any
/// string; unknown ids simply do not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryId(String);

impl QueryId {
    /// Wrap an id verbatim (no normalization)
    pub fn new(id: impl Into<String>) -> Self {
        QueryId(id.into())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for QueryId {
    fn from(s: &str) -> Self {
        QueryId(s.to_string())
    }
}

impl From<String> for QueryId {
    fn from(s: String) -> Self {
        QueryId(s)
    }
}

impl std::fmt::Display for QueryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key a job is tracked under
///
/// At most one job exists per key; dispatching again overwrites it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobKey {
    /// Trace the query runs against
    pub trace_id: TraceId,
    /// Query being executed
    pub query_id: QueryId,
}

impl JobKey {
    /// Create a new job key
    pub fn new(trace_id: TraceId, query_id: QueryId) -> Self {
        Self { trace_id, query_id }
    }
}

impl std::fmt::Display for JobKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.trace_id, self.query_id)
    }
}
