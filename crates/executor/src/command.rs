//! Commands accepted by the [`crate::Executor`]
//!
//! Every operation of the lab is one [`Command`] variant. Commands are plain
//! data so they can be built by the CLI, by the typed [`crate::TraceLab`]
//! wrapper, or decoded from JSON:
//!
//! ```json
//! {"command": "dispatch_query", "trace_id": "8f0c…", "query_id": "slow_frames"}
//! ```

use serde::{Deserialize, Serialize};
use tracelab_core::{QueryId, TraceId};

/// A request to the lab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Liveness check
    Ping,

    // ==================== Queries ====================
    /// List predefined and custom queries
    ListQueries,

    /// Save a custom query under the id derived from `name`
    AddQuery {
        /// Display name
        name: String,
        /// SQL text
        sql: String,
    },

    /// Remove a custom query; no-op if absent
    DeleteQuery {
        /// Query to remove
        query_id: QueryId,
    },

    // ==================== Jobs ====================
    /// Run a query against a trace in the background
    DispatchQuery {
        /// Trace to query
        trace_id: TraceId,
        /// Query to run
        query_id: QueryId,
    },

    /// Read the state of a dispatched query
    PollJob {
        /// Trace the query was dispatched against
        trace_id: TraceId,
        /// Query that was dispatched
        query_id: QueryId,
    },

    // ==================== Devices ====================
    /// List connected devices
    ListDevices,

    /// Capture a trace from a device in the background
    StartCapture {
        /// Device serial
        device_id: String,
    },
}

impl Command {
    /// Variant name, for logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::Ping => "Ping",
            Command::ListQueries => "ListQueries",
            Command::AddQuery { .. } => "AddQuery",
            Command::DeleteQuery { .. } => "DeleteQuery",
            Command::DispatchQuery { .. } => "DispatchQuery",
            Command::PollJob { .. } => "PollJob",
            Command::ListDevices => "ListDevices",
            Command::StartCapture { .. } => "StartCapture",
        }
    }
}
