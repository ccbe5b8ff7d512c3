//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tracelab::engine::{DeviceBridge, QueryRunner};
use tracelab::{Error, QueryTable, Result, Scalar, TraceId, TraceLab};

/// Generous bound for jobs that should finish quickly.
pub const WAIT: Duration = Duration::from_secs(10);

/// In-process engine.
///
/// Returns the trace contents and the query text as one row, after an
/// optional delay. Queries containing `FAIL` fail the way a bad query does.
#[derive(Default)]
pub struct FakeEngine {
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay: Some(delay),
        }
    }

    /// Number of engine runs so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl QueryRunner for FakeEngine {
    fn execute(&self, trace_path: &Path, query_text: &str) -> Result<QueryTable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if query_text.contains("FAIL") {
            return Err(Error::Engine("near \"FAIL\": syntax error".into()));
        }
        let trace = std::fs::read_to_string(trace_path)?;
        QueryTable::new(
            vec!["trace".into(), "query".into()],
            vec![vec![Scalar::from(trace), Scalar::from(query_text)]],
        )
    }
}

/// Device bridge with no devices attached.
pub struct NoDevices;

impl DeviceBridge for NoDevices {
    fn list_devices(&self) -> Vec<String> {
        Vec::new()
    }

    fn record(&self, device_id: &str, _config: &[u8]) -> Result<Vec<u8>> {
        Err(Error::Capture(format!("{} is not connected", device_id)))
    }
}

/// A lab over a temporary data directory and a fake engine.
pub struct TestLab {
    pub dir: TempDir,
    pub lab: TraceLab,
    pub engine: Arc<FakeEngine>,
}

impl TestLab {
    pub fn new() -> Self {
        Self::with_engine(FakeEngine::new())
    }

    pub fn with_engine(engine: FakeEngine) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let engine = Arc::new(engine);
        let lab = open_lab(dir.path(), engine.clone());
        Self { dir, lab, engine }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Place a finished trace artifact, as a successful capture would.
    pub fn add_trace(&self, bytes: &[u8]) -> TraceId {
        let id = TraceId::new();
        self.write_trace(&id, bytes);
        id
    }

    pub fn write_trace(&self, id: &TraceId, bytes: &[u8]) {
        let path = self.lab.config().traces_dir().join(format!("{}.pftrace", id));
        std::fs::write(path, bytes).unwrap();
    }
}

/// Open a lab over `data_dir` using `engine`. Call inside a Tokio runtime.
pub fn open_lab(data_dir: &Path, engine: Arc<FakeEngine>) -> TraceLab {
    TraceLab::builder()
        .data_dir(data_dir)
        .workers(4)
        .runner(engine)
        .bridge(Arc::new(NoDevices))
        .open()
        .unwrap()
}
