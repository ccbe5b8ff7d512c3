//! Query runner contract

use std::path::Path;
use tracelab_core::{QueryTable, Result};

/// Executes SQL against a trace file
///
/// Implementations are blocking and are called from worker threads. They
/// must not retry: engine failures are deterministic (bad SQL, malformed
/// trace) and engine start-up is expensive.
///
/// # Errors
///
/// - `ArtifactNotFound`: the trace file is absent
/// - `Engine`: the engine ran and reported a problem (carries its diagnostic)
/// - `EngineUnavailable`: the engine is missing or cannot be started
/// - `EngineTimeout`: the engine exceeded its deadline
pub trait QueryRunner: Send + Sync {
    /// Run `query_text` against the trace at `trace_path`
    fn execute(&self, trace_path: &Path, query_text: &str) -> Result<QueryTable>;
}
