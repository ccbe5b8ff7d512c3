//! Job command handlers
//!
//! DispatchQuery, PollJob

use tracelab_core::{Error, QueryId, TraceId};

use crate::jobs::JobTracker;
use crate::{JobView, Output, Result};

/// Handle DispatchQuery command.
pub fn dispatch_query(tracker: &JobTracker, trace_id: &TraceId, query_id: &QueryId) -> Result<Output> {
    // decoded commands bypass TraceId::parse
    let trace_id = TraceId::parse(trace_id.as_str())?;
    let key = tracker.dispatch(&trace_id, query_id)?;
    Ok(Output::Accepted(key))
}

/// Handle PollJob command.
pub fn poll_job(tracker: &JobTracker, trace_id: &TraceId, query_id: &QueryId) -> Result<Output> {
    match tracker.poll(trace_id, query_id) {
        Some(job) => Ok(Output::Job(JobView::from(job))),
        None => Err(Error::NotFound(format!("job {}/{}", trace_id, query_id))),
    }
}
