//! Lab configuration
//!
//! [`LabConfig`] is read from a TOML file; every field is optional and
//! falls back to its default:
//!
//! ```toml
//! data_dir = ".tracelab"
//! engine_binary = "trace_processor_shell"
//! engine_timeout_secs = 120
//! adb_binary = "adb"
//! capture_config = "trace_config.pbtxt"
//! capture_timeout_secs = 60
//! workers = 4
//! # result_cache_max_entries = 10000
//! ```
//!
//! Everything persistent lives under `data_dir`:
//!
//! ```text
//! <data_dir>/traces/<trace_id>.pftrace
//! <data_dir>/cache/custom_queries.json
//! <data_dir>/cache/query_results.json
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracelab_core::{Error, Result};

const TRACES_DIR: &str = "traces";
const CACHE_DIR: &str = "cache";
const CUSTOM_QUERIES_FILE: &str = "custom_queries.json";
const QUERY_RESULTS_FILE: &str = "query_results.json";

/// Settings for a [`crate::TraceLab`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabConfig {
    /// Root of all persisted state.
    /// Default: `.tracelab`.
    pub data_dir: PathBuf,

    /// Path or name of the `trace_processor_shell` binary.
    /// Default: `trace_processor_shell` (looked up on `PATH`).
    pub engine_binary: PathBuf,

    /// Deadline for one engine run, in seconds.
    /// Default: 120.
    pub engine_timeout_secs: u64,

    /// Path or name of the `adb` binary.
    /// Default: `adb`.
    pub adb_binary: PathBuf,

    /// Perfetto text config streamed to the device on capture.
    /// Default: `trace_config.pbtxt`.
    pub capture_config: PathBuf,

    /// Deadline for one capture, in seconds.
    /// Default: 60.
    pub capture_timeout_secs: u64,

    /// Number of job workers.
    /// Default: 4.
    pub workers: usize,

    /// Upper bound on cached results; oldest are evicted first.
    /// Default: unbounded.
    pub result_cache_max_entries: Option<usize>,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".tracelab"),
            engine_binary: PathBuf::from("trace_processor_shell"),
            engine_timeout_secs: 120,
            adb_binary: PathBuf::from("adb"),
            capture_config: PathBuf::from("trace_config.pbtxt"),
            capture_timeout_secs: 60,
            workers: 4,
            result_cache_max_entries: None,
        }
    }
}

impl LabConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: LabConfig =
            toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Reject settings the lab cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::Config("workers must be at least 1".into()));
        }
        if self.engine_timeout_secs == 0 {
            return Err(Error::Config("engine_timeout_secs must be positive".into()));
        }
        if self.capture_timeout_secs == 0 {
            return Err(Error::Config("capture_timeout_secs must be positive".into()));
        }
        if self.result_cache_max_entries == Some(0) {
            return Err(Error::Config(
                "result_cache_max_entries must be positive when set".into(),
            ));
        }
        Ok(())
    }

    /// Directory holding trace artifacts
    pub fn traces_dir(&self) -> PathBuf {
        self.data_dir.join(TRACES_DIR)
    }

    /// Directory holding the JSON stores
    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir.join(CACHE_DIR)
    }

    /// Query store file
    pub fn custom_queries_path(&self) -> PathBuf {
        self.cache_dir().join(CUSTOM_QUERIES_FILE)
    }

    /// Result cache file
    pub fn query_results_path(&self) -> PathBuf {
        self.cache_dir().join(QUERY_RESULTS_FILE)
    }

    /// Engine deadline
    pub fn engine_timeout(&self) -> Duration {
        Duration::from_secs(self.engine_timeout_secs)
    }

    /// Capture deadline
    pub fn capture_timeout(&self) -> Duration {
        Duration::from_secs(self.capture_timeout_secs)
    }
}
