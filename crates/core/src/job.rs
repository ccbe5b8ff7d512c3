//! Job state for asynchronously executed queries
//!
//! ```text
//! Pending ──► Processing ──► Complete
//!                       └──► Error
//! ```
//!
//! Dispatching the same key again starts over at `Pending` with a higher
//! dispatch number. No history is kept.

use crate::error::Error;
use crate::fingerprint::Fingerprint;
use crate::table::QueryTable;
use crate::types::JobKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepted, waiting for a worker
    Pending,
    /// A worker is executing it
    Processing,
    /// Finished with a result table
    Complete,
    /// Finished with an error
    Error,
}

impl JobStatus {
    /// Check if no further transition will happen for this dispatch
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Error)
    }

    /// Lower-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Complete => "complete",
            JobStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Key the job is tracked under
    pub key: JobKey,
    /// Current status
    pub status: JobStatus,
    /// Dispatch generation; increases on every dispatch of any key
    pub dispatch: u64,
    /// Result table, present only when `Complete`
    pub data: Option<QueryTable>,
    /// Error message, present only when `Error`
    pub error: Option<String>,
    /// Canonical error code, present only when `Error`
    pub error_code: Option<String>,
    /// Whether the result was served from the result cache
    pub cached: bool,
    /// Cache key, once computed
    pub fingerprint: Option<Fingerprint>,
    /// Time of the last transition
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// A freshly dispatched job
    pub fn pending(key: JobKey, dispatch: u64) -> Self {
        Self {
            key,
            status: JobStatus::Pending,
            dispatch,
            data: None,
            error: None,
            error_code: None,
            cached: false,
            fingerprint: None,
            updated_at: Utc::now(),
        }
    }

    /// Transition to `Processing`
    pub fn start(&mut self) {
        self.status = JobStatus::Processing;
        self.updated_at = Utc::now();
    }

    /// Transition to `Complete`
    pub fn complete(&mut self, table: QueryTable, fingerprint: Fingerprint, cached: bool) {
        self.status = JobStatus::Complete;
        self.data = Some(table);
        self.error = None;
        self.error_code = None;
        self.fingerprint = Some(fingerprint);
        self.cached = cached;
        self.updated_at = Utc::now();
    }

    /// Transition to `Error`
    pub fn fail(&mut self, error: &Error) {
        self.status = JobStatus::Error;
        self.data = None;
        self.error = Some(error.to_string());
        self.error_code = Some(error.error_code().to_string());
        self.updated_at = Utc::now();
    }

    /// Check if the job reached a terminal state
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
