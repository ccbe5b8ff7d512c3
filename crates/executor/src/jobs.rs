//! Job tracker
//!
//! Runs queries in the background and keeps one pollable [`Job`] per
//! (trace, query) pair.
//!
//! ```text
//! dispatch ──► Pending ──► queue ──► worker: Processing
//!                                      │
//!                    digest + fingerprint ──► cache hit ──► Complete (cached)
//!                                      │
//!                                    miss ──► runner ──► cache store ──► Complete
//!                                                   └──► Error
//! ```
//!
//! Every dispatch takes a new generation number. A worker writes a state
//! only while the job still carries the generation it was queued with, so
//! a re-dispatch is never overwritten by the work of an earlier one.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch, Mutex};
use tracelab_core::{Error, Fingerprint, Job, JobKey, QueryId, QueryTable, Result, TraceId};
use tracelab_engine::{QueryRunner, TraceArtifacts};
use tracelab_storage::{QueryStore, ResultCache};
use tracing::{debug, error, info, warn};

/// Slack on top of the engine deadline before the tracker gives up on a run
const TIMEOUT_GRACE: Duration = Duration::from_secs(5);

/// Collaborators a [`JobTracker`] executes against
#[derive(Clone)]
pub struct JobContext {
    /// Named queries
    pub store: Arc<QueryStore>,
    /// Results by fingerprint
    pub cache: Arc<ResultCache>,
    /// Trace files
    pub artifacts: Arc<TraceArtifacts>,
    /// Engine
    pub runner: Arc<dyn QueryRunner>,
    /// Deadline for one engine run
    pub engine_timeout: Duration,
}

struct WorkUnit {
    key: JobKey,
    dispatch: u64,
    query_text: String,
}

struct Shared {
    ctx: JobContext,
    jobs: DashMap<JobKey, Job>,
    next_dispatch: AtomicU64,
    completions: watch::Sender<u64>,
}

/// Asynchronous query execution with pollable status
///
/// Must be started inside a Tokio runtime. Workers stop once the tracker is
/// dropped and the queue drains.
pub struct JobTracker {
    shared: Arc<Shared>,
    queue: mpsc::UnboundedSender<WorkUnit>,
}

impl JobTracker {
    /// Start `workers` workers on the current runtime
    ///
    /// # Errors
    ///
    /// `Config` if `workers` is zero, `Internal` if called outside a Tokio
    /// runtime.
    pub fn start(ctx: JobContext, workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(Error::Config("workers must be at least 1".into()));
        }
        let handle = Handle::try_current().map_err(|_| {
            Error::Internal("job tracker must be started inside a Tokio runtime".into())
        })?;

        let (completions, _) = watch::channel(0);
        let shared = Arc::new(Shared {
            ctx,
            jobs: DashMap::new(),
            next_dispatch: AtomicU64::new(1),
            completions,
        });
        let (queue, rx) = mpsc::unbounded_channel();
        let rx = Arc::new(Mutex::new(rx));
        for worker in 0..workers {
            handle.spawn(worker_loop(worker, Arc::clone(&shared), Arc::clone(&rx)));
        }
        info!(workers, "Job tracker started");
        Ok(Self { shared, queue })
    }

    /// Accept a query for background execution
    ///
    /// The job is `Pending` (or, for a result already cached against a
    /// trace hashed earlier, `Complete`) by the time this returns.
    ///
    /// # Errors
    ///
    /// - `ArtifactNotFound`: no trace file for `trace_id`
    /// - `NotFound`: `query_id` resolves to no query
    /// - `Storage`: the query store cannot be read
    ///
    /// No job is created or changed on error.
    pub fn dispatch(&self, trace_id: &TraceId, query_id: &QueryId) -> Result<JobKey> {
        let ctx = &self.shared.ctx;
        ctx.artifacts.require(trace_id)?;
        let query_text = ctx
            .store
            .get(query_id)?
            .ok_or_else(|| Error::NotFound(format!("query {}", query_id)))?;

        let key = JobKey::new(trace_id.clone(), query_id.clone());
        let dispatch = self.shared.next_dispatch.fetch_add(1, Ordering::SeqCst);

        if let Some(job) = self.shared.cached_job(&key, dispatch, &query_text) {
            debug!(job = %key, dispatch, "Served from cache at dispatch");
            self.shared.jobs.insert(key.clone(), job);
            self.shared.notify();
            return Ok(key);
        }

        self.shared
            .jobs
            .insert(key.clone(), Job::pending(key.clone(), dispatch));
        self.queue
            .send(WorkUnit {
                key: key.clone(),
                dispatch,
                query_text,
            })
            .map_err(|_| Error::Internal("job queue is closed".into()))?;
        debug!(job = %key, dispatch, "Job queued");
        Ok(key)
    }

    /// Current state of a job, `None` if it was never dispatched
    pub fn poll(&self, trace_id: &TraceId, query_id: &QueryId) -> Option<Job> {
        self.get(&JobKey::new(trace_id.clone(), query_id.clone()))
    }

    /// Current state of a job by key
    pub fn get(&self, key: &JobKey) -> Option<Job> {
        self.shared.jobs.get(key).map(|job| job.value().clone())
    }

    /// Wait until a job is terminal or `timeout` elapses
    ///
    /// Returns the last observed state, `None` if the job does not exist.
    pub async fn wait(&self, key: &JobKey, timeout: Duration) -> Option<Job> {
        let mut changes = self.shared.completions.subscribe();
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            match self.get(key) {
                None => return None,
                Some(job) if job.is_terminal() => return Some(job),
                Some(_) => {}
            }
            match tokio::time::timeout_at(deadline, changes.changed()).await {
                Ok(Ok(())) => {}
                _ => return self.get(key),
            }
        }
    }

    /// Longest a single job can stay `Processing` before it is failed
    pub fn run_deadline(&self) -> Duration {
        self.shared.ctx.engine_timeout + TIMEOUT_GRACE
    }

    /// Number of tracked jobs
    pub fn len(&self) -> usize {
        self.shared.jobs.len()
    }

    /// Check if no job was ever dispatched
    pub fn is_empty(&self) -> bool {
        self.shared.jobs.is_empty()
    }
}

impl Shared {
    /// A completed job if the result can be served without hashing the trace
    fn cached_job(&self, key: &JobKey, dispatch: u64, query_text: &str) -> Option<Job> {
        let digest = self.ctx.artifacts.memoized_digest(&key.trace_id)?;
        let fingerprint = Fingerprint::derive(&digest, query_text);
        let entry = self.ctx.cache.lookup(&fingerprint)?;
        let mut job = Job::pending(key.clone(), dispatch);
        job.complete(entry.table, fingerprint, true);
        Some(job)
    }

    /// Apply `f` to the job if it still belongs to `dispatch`
    fn transition(&self, key: &JobKey, dispatch: u64, f: impl FnOnce(&mut Job)) -> bool {
        match self.jobs.get_mut(key) {
            Some(mut job) if job.dispatch == dispatch => {
                f(job.value_mut());
                true
            }
            _ => false,
        }
    }

    fn notify(&self) {
        self.completions.send_modify(|n| *n = n.wrapping_add(1));
    }

    /// Cache lookup, then engine run and cache store on a miss
    ///
    /// Blocking; runs on the blocking pool.
    fn execute(&self, key: &JobKey, query_text: &str) -> Result<(QueryTable, Fingerprint, bool)> {
        let digest = self.ctx.artifacts.digest(&key.trace_id)?;
        let fingerprint = Fingerprint::derive(&digest, query_text);
        if let Some(entry) = self.ctx.cache.lookup(&fingerprint) {
            debug!(job = %key, fingerprint = %fingerprint.short(), "Cache hit");
            return Ok((entry.table, fingerprint, true));
        }

        let trace_path = self.ctx.artifacts.require(&key.trace_id)?;
        let table = self.ctx.runner.execute(&trace_path, query_text)?;
        if let Err(e) = self.ctx.cache.store(fingerprint, &table) {
            warn!(job = %key, fingerprint = %fingerprint.short(), error = %e, "Result not cached");
        }
        Ok((table, fingerprint, false))
    }
}

async fn worker_loop(
    worker: usize,
    shared: Arc<Shared>,
    queue: Arc<Mutex<mpsc::UnboundedReceiver<WorkUnit>>>,
) {
    loop {
        let unit = { queue.lock().await.recv().await };
        match unit {
            Some(unit) => run_unit(worker, &shared, unit).await,
            None => break,
        }
    }
    debug!(worker, "Job worker stopped");
}

async fn run_unit(worker: usize, shared: &Arc<Shared>, unit: WorkUnit) {
    let WorkUnit {
        key,
        dispatch,
        query_text,
    } = unit;

    if !shared.transition(&key, dispatch, |job| job.start()) {
        debug!(job = %key, dispatch, "Superseded before start");
        return;
    }
    debug!(worker, job = %key, dispatch, "Job processing");

    let limit = shared.ctx.engine_timeout + TIMEOUT_GRACE;
    let task = {
        let shared = Arc::clone(shared);
        let key = key.clone();
        tokio::task::spawn_blocking(move || shared.execute(&key, &query_text))
    };
    let outcome = match tokio::time::timeout(limit, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => {
            error!(job = %key, error = %join_error, "Job panicked");
            Err(Error::Internal(format!("query execution panicked: {}", join_error)))
        }
        Err(_) => Err(Error::EngineTimeout {
            secs: shared.ctx.engine_timeout.as_secs(),
        }),
    };

    let applied = shared.transition(&key, dispatch, |job| match &outcome {
        Ok((table, fingerprint, cached)) => job.complete(table.clone(), *fingerprint, *cached),
        Err(e) => job.fail(e),
    });
    match (&outcome, applied) {
        (_, false) => debug!(job = %key, dispatch, "Superseded, result discarded"),
        (Ok((table, _, cached)), true) => {
            info!(job = %key, rows = table.len(), cached = *cached, "Job complete")
        }
        (Err(e), true) => warn!(job = %key, code = e.error_code(), error = %e, "Job failed"),
    }
    shared.notify();
}
