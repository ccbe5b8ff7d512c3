//! Executor tests against an in-process engine and device bridge


use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracelab_core::{QueryTable, Result, Scalar};
use tracelab_engine::{DeviceBridge, QueryRunner};

use crate::{TraceLab, TraceLabBuilder};

/// Runner echoing the trace contents and query text as a single row
#[derive(Default)]
pub(crate) struct EchoRunner {
    pub calls: AtomicUsize,
}

impl EchoRunner {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl QueryRunner for EchoRunner {
    fn execute(&self, trace_path: &Path, query_text: &str) -> Result<QueryTable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let trace = std::fs::read_to_string(trace_path)?;
        QueryTable::new(
            vec!["trace".into(), "query".into()],
            vec![vec![Scalar::from(trace), Scalar::from(query_text)]],
        )
    }
}

/// Bridge with a fixed device list that records a fixed payload
pub(crate) struct FakeBridge {
    pub devices: Vec<String>,
}

impl DeviceBridge for FakeBridge {
    fn list_devices(&self) -> Vec<String> {
        self.devices.clone()
    }

    fn record(&self, _device_id: &str, _config: &[u8]) -> Result<Vec<u8>> {
        Ok(b"captured trace".to_vec())
    }
}

pub(crate) struct TestLab {
    pub _dir: tempfile::TempDir,
    pub lab: TraceLab,
    pub runner: Arc<EchoRunner>,
}

impl TestLab {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let capture_config = dir.path().join("trace_config.pbtxt");
        std::fs::write(&capture_config, b"duration_ms: 1000").unwrap();
        let runner = Arc::new(EchoRunner::default());
        let lab = TraceLabBuilder::new()
            .data_dir(dir.path().join("data"))
            .capture_config(capture_config)
            .workers(2)
            .runner(runner.clone())
            .bridge(Arc::new(FakeBridge {
                devices: vec!["emulator-5554".into()],
            }))
            .open()
            .unwrap();
        Self {
            _dir: dir,
            lab,
            runner,
        }
    }

    /// Write a trace artifact directly, as a finished capture would
    pub fn add_trace(&self, id: &str, bytes: &[u8]) {
        let path = self.lab.config().traces_dir().join(format!("{}.pftrace", id));
        std::fs::write(path, bytes).unwrap();
    }
}
