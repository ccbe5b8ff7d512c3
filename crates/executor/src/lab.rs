//! High-level typed wrapper for the Executor.
//!
//! [`TraceLab`] wraps the [`Executor`] and its [`Command`]/[`Output`] enums
//! with typed method calls.
//!
//! # Example
//!
//! ```ignore
//! use tracelab_executor::TraceLab;
//!
//! let lab = TraceLab::builder().data_dir("/tmp/lab").open()?;
//! let query = lab.add_query("Slow Frames", "SELECT * FROM actual_frame_timeline_slice")?;
//! let key = lab.dispatch(&trace, &query)?;
//! let job = lab.wait(&key, Duration::from_secs(30)).await;
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracelab_core::{Error, Job, JobKey, QueryId, Result, TraceId};
use tracelab_engine::{AdbBridge, DeviceBridge, QueryRunner, TraceProcessorShell};

use crate::{Command, Executor, JobView, LabConfig, Output, QueryInfo};

/// Typed access to a lab
///
/// Each method builds a [`Command`], executes it and unwraps the expected
/// [`Output`] variant.
pub struct TraceLab {
    executor: Executor,
}

impl TraceLab {
    /// Open a lab with `config` and the production engine and device bridge
    pub fn open(config: LabConfig) -> Result<Self> {
        TraceLabBuilder::from_config(config).open()
    }

    /// Builder with default settings
    pub fn builder() -> TraceLabBuilder {
        TraceLabBuilder::new()
    }

    /// Get the underlying executor.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Settings the lab was opened with
    pub fn config(&self) -> &LabConfig {
        self.executor.config()
    }

    // =========================================================================
    // Lab
    // =========================================================================

    /// Ping the lab.
    pub fn ping(&self) -> Result<String> {
        match self.executor.execute(Command::Ping)? {
            Output::Pong { version } => Ok(version),
            _ => Err(unexpected("Ping")),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// List predefined and custom queries, ordered by id.
    pub fn list_queries(&self) -> Result<Vec<QueryInfo>> {
        match self.executor.execute(Command::ListQueries)? {
            Output::Queries(queries) => Ok(queries),
            _ => Err(unexpected("ListQueries")),
        }
    }

    /// Save a custom query, returning its derived id.
    pub fn add_query(&self, name: &str, sql: &str) -> Result<QueryId> {
        match self.executor.execute(Command::AddQuery {
            name: name.to_string(),
            sql: sql.to_string(),
        })? {
            Output::QueryAdded { query_id } => Ok(query_id),
            _ => Err(unexpected("AddQuery")),
        }
    }

    /// Remove a custom query.
    pub fn delete_query(&self, query_id: &str) -> Result<()> {
        match self.executor.execute(Command::DeleteQuery {
            query_id: QueryId::from(query_id),
        })? {
            Output::Unit => Ok(()),
            _ => Err(unexpected("DeleteQuery")),
        }
    }

    // =========================================================================
    // Jobs
    // =========================================================================

    /// Run a query against a trace in the background.
    pub fn dispatch(&self, trace_id: &str, query_id: &str) -> Result<JobKey> {
        match self.executor.execute(Command::DispatchQuery {
            trace_id: TraceId::parse(trace_id)?,
            query_id: QueryId::from(query_id),
        })? {
            Output::Accepted(key) => Ok(key),
            _ => Err(unexpected("DispatchQuery")),
        }
    }

    /// Current state of a dispatched query.
    pub fn poll(&self, trace_id: &str, query_id: &str) -> Result<JobView> {
        match self.executor.execute(Command::PollJob {
            trace_id: TraceId::parse(trace_id)?,
            query_id: QueryId::from(query_id),
        })? {
            Output::Job(view) => Ok(view),
            _ => Err(unexpected("PollJob")),
        }
    }

    /// Wait until a job is terminal or `timeout` elapses.
    pub async fn wait(&self, key: &JobKey, timeout: Duration) -> Option<Job> {
        self.executor.tracker().wait(key, timeout).await
    }

    // =========================================================================
    // Devices
    // =========================================================================

    /// Serial numbers of connected devices.
    pub fn list_devices(&self) -> Result<Vec<String>> {
        match self.executor.execute(Command::ListDevices)? {
            Output::Devices(devices) => Ok(devices),
            _ => Err(unexpected("ListDevices")),
        }
    }

    /// Start capturing a trace, returning the id it will be published under.
    pub fn start_capture(&self, device_id: &str) -> Result<TraceId> {
        match self.executor.execute(Command::StartCapture {
            device_id: device_id.to_string(),
        })? {
            Output::CaptureStarted { trace_id } => Ok(trace_id),
            _ => Err(unexpected("StartCapture")),
        }
    }

    /// Capture a trace and wait until it is published.
    pub async fn capture(&self, device_id: &str) -> Result<TraceId> {
        self.executor.capture(device_id).await
    }
}

fn unexpected(command: &str) -> Error {
    Error::Internal(format!("Unexpected output for {}", command))
}

/// Builder for [`TraceLab`]
///
/// Starts from [`LabConfig::default`]; each setter overrides one field.
/// The engine and device bridge default to `trace_processor_shell` and
/// `adb` as configured, and can be replaced.
pub struct TraceLabBuilder {
    config: LabConfig,
    runner: Option<Arc<dyn QueryRunner>>,
    bridge: Option<Arc<dyn DeviceBridge>>,
}

impl TraceLabBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::from_config(LabConfig::default())
    }

    /// Builder starting from `config`
    pub fn from_config(config: LabConfig) -> Self {
        Self {
            config,
            runner: None,
            bridge: None,
        }
    }

    /// Load settings from a TOML file, replacing all previous settings.
    pub fn config_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        self.config = LabConfig::load(path.as_ref())?;
        Ok(self)
    }

    /// Set the data directory.
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the `trace_processor_shell` binary.
    pub fn engine_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.engine_binary = path.into();
        self
    }

    /// Set the engine deadline.
    pub fn engine_timeout(mut self, timeout: Duration) -> Self {
        self.config.engine_timeout_secs = timeout.as_secs();
        self
    }

    /// Set the `adb` binary.
    pub fn adb_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.adb_binary = path.into();
        self
    }

    /// Set the Perfetto config used for captures.
    pub fn capture_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.capture_config = path.into();
        self
    }

    /// Set the number of job workers.
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Bound the result cache.
    pub fn result_cache_max_entries(mut self, max_entries: usize) -> Self {
        self.config.result_cache_max_entries = Some(max_entries);
        self
    }

    /// Use `runner` instead of `trace_processor_shell`.
    pub fn runner(mut self, runner: Arc<dyn QueryRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    /// Use `bridge` instead of `adb`.
    pub fn bridge(mut self, bridge: Arc<dyn DeviceBridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// Open the lab. Must be called inside a Tokio runtime.
    pub fn open(self) -> Result<TraceLab> {
        let config = self.config;
        let runner = self.runner.unwrap_or_else(|| {
            Arc::new(TraceProcessorShell::new(
                config.engine_binary.clone(),
                config.engine_timeout(),
            ))
        });
        let bridge = self.bridge.unwrap_or_else(|| {
            Arc::new(AdbBridge::new(
                config.adb_binary.clone(),
                config.capture_timeout(),
            ))
        });
        Ok(TraceLab {
            executor: Executor::new(config, runner, bridge)?,
        })
    }
}

impl Default for TraceLabBuilder {
    fn default() -> Self {
        Self::new()
    }
}
