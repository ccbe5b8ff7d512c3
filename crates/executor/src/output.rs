//! Results returned by the [`crate::Executor`]

use serde::{Deserialize, Serialize};
use tracelab_core::{Job, JobKey, JobStatus, QueryId, QueryTable, TraceId};

/// One row of [`Output::Queries`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryInfo {
    /// Query id
    pub query_id: QueryId,
    /// Display name
    pub name: String,
    /// `false` for built-in queries
    pub is_custom: bool,
}

/// Externally visible state of a job
///
/// `data` is present only when `Complete`, `error` only when `Error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobView {
    /// Lifecycle state
    pub status: JobStatus,
    /// Result table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<QueryTable>,
    /// Error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Canonical error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Result was served from the cache
    pub cached: bool,
}

impl From<Job> for JobView {
    fn from(job: Job) -> Self {
        let complete = job.status == JobStatus::Complete;
        let failed = job.status == JobStatus::Error;
        Self {
            status: job.status,
            data: job.data.filter(|_| complete),
            error: job.error.filter(|_| failed),
            error_code: job.error_code.filter(|_| failed),
            cached: job.cached,
        }
    }
}

/// Result of executing a [`crate::Command`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "output", content = "value", rename_all = "snake_case")]
pub enum Output {
    /// Reply to `Ping`
    Pong {
        /// Crate version
        version: String,
    },
    /// Reply to `ListQueries`, ordered by id
    Queries(Vec<QueryInfo>),
    /// Reply to `AddQuery`
    QueryAdded {
        /// Id the query was saved under
        query_id: QueryId,
    },
    /// Success without a value
    Unit,
    /// Reply to `DispatchQuery`
    Accepted(JobKey),
    /// Reply to `PollJob`
    Job(JobView),
    /// Reply to `ListDevices`
    Devices(Vec<String>),
    /// Reply to `StartCapture`
    CaptureStarted {
        /// Id the trace will be published under
        trace_id: TraceId,
    },
    /// A trace recorded by [`crate::Executor::capture`]
    Captured {
        /// Id the trace was published under
        trace_id: TraceId,
    },
}
