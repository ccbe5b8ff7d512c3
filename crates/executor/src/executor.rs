//! Command dispatch
//!
//! The [`Executor`] owns the lab's components and routes each [`Command`]
//! to its handler.

use std::sync::Arc;

use tokio::runtime::Handle;
use tracelab_core::{Error, Result, TraceId};
use tracelab_engine::{DeviceBridge, QueryRunner, TraceArtifacts};
use tracelab_storage::{QueryStore, ResultCache};
use tracing::{debug, info};

use crate::handlers;
use crate::jobs::{JobContext, JobTracker};
use crate::{Command, LabConfig, Output};

/// Executes [`Command`]s against one data directory
pub struct Executor {
    config: LabConfig,
    store: Arc<QueryStore>,
    cache: Arc<ResultCache>,
    artifacts: Arc<TraceArtifacts>,
    bridge: Arc<dyn DeviceBridge>,
    tracker: JobTracker,
    runtime: Handle,
}

impl Executor {
    /// Open the data directory and start the job workers
    ///
    /// Must be called inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// `Config` for invalid settings, `StorageError` if the data directory
    /// cannot be created, `Internal` outside a Tokio runtime.
    pub fn new(
        config: LabConfig,
        runner: Arc<dyn QueryRunner>,
        bridge: Arc<dyn DeviceBridge>,
    ) -> Result<Self> {
        config.validate()?;
        let runtime = Handle::try_current()
            .map_err(|_| Error::Internal("executor must be created inside a Tokio runtime".into()))?;

        std::fs::create_dir_all(config.traces_dir())?;
        std::fs::create_dir_all(config.cache_dir())?;

        let store = Arc::new(QueryStore::open(config.custom_queries_path()));
        let cache = Arc::new(
            ResultCache::open(config.query_results_path())
                .with_max_entries(config.result_cache_max_entries),
        );
        let artifacts = Arc::new(TraceArtifacts::new(config.traces_dir()));
        let tracker = JobTracker::start(
            JobContext {
                store: Arc::clone(&store),
                cache: Arc::clone(&cache),
                artifacts: Arc::clone(&artifacts),
                runner,
                engine_timeout: config.engine_timeout(),
            },
            config.workers,
        )?;

        info!(data_dir = %config.data_dir.display(), workers = config.workers, "Executor ready");
        Ok(Self {
            config,
            store,
            cache,
            artifacts,
            bridge,
            tracker,
            runtime,
        })
    }

    /// Execute a command
    pub fn execute(&self, cmd: Command) -> Result<Output> {
        debug!(command = cmd.name(), "Executing");
        match cmd {
            Command::Ping => Ok(Output::Pong {
                version: env!("CARGO_PKG_VERSION").to_string(),
            }),
            Command::ListQueries => handlers::queries::list_queries(&self.store),
            Command::AddQuery { name, sql } => handlers::queries::add_query(&self.store, &name, &sql),
            Command::DeleteQuery { query_id } => {
                handlers::queries::delete_query(&self.store, &query_id)
            }
            Command::DispatchQuery { trace_id, query_id } => {
                handlers::jobs::dispatch_query(&self.tracker, &trace_id, &query_id)
            }
            Command::PollJob { trace_id, query_id } => {
                handlers::jobs::poll_job(&self.tracker, &trace_id, &query_id)
            }
            Command::ListDevices => handlers::devices::list_devices(self.bridge.as_ref()),
            Command::StartCapture { device_id } => handlers::devices::start_capture(
                &self.runtime,
                &self.bridge,
                &self.artifacts,
                self.config.capture_config.clone(),
                &device_id,
            ),
        }
    }

    /// Record a trace on `device_id` and wait until it is published
    ///
    /// The waiting form of `StartCapture`, for callers that may exit as soon
    /// as the command returns.
    pub async fn capture(&self, device_id: &str) -> Result<TraceId> {
        handlers::devices::capture(
            &self.runtime,
            &self.bridge,
            &self.artifacts,
            self.config.capture_config.clone(),
            device_id,
        )
        .await
    }

    /// Settings the executor was opened with
    pub fn config(&self) -> &LabConfig {
        &self.config
    }

    /// Job tracker
    pub fn tracker(&self) -> &JobTracker {
        &self.tracker
    }

    /// Query store
    pub fn store(&self) -> &Arc<QueryStore> {
        &self.store
    }

    /// Result cache
    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// Trace artifacts
    pub fn artifacts(&self) -> &Arc<TraceArtifacts> {
        &self.artifacts
    }
}
