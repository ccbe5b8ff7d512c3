//! Device discovery and trace capture over `adb`
//!
//! Capture streams the trace straight off the device:
//!
//! ```text
//! adb -s <device> shell 'perfetto -c - -o - --txt'  < config  > trace
//! ```
//!
//! so nothing is written to the device's filesystem. The trace lands in the
//! artifact's partial path and is renamed into place only after the capture
//! succeeds; a running or failed capture is indistinguishable from "no trace
//! yet" to query dispatch.

use crate::artifacts::TraceArtifacts;
use crate::process::{run_with_deadline, ProcessError};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracelab_core::{Error, Result, TraceId};
use tracing::{debug, info, warn};

const LIST_TIMEOUT: Duration = Duration::from_secs(10);
const PERFETTO_STREAM: &str = "perfetto -c - -o - --txt";

/// Access to connected devices
pub trait DeviceBridge: Send + Sync {
    /// Serial numbers of devices ready for use
    ///
    /// A missing or failing bridge tool yields an empty list.
    fn list_devices(&self) -> Vec<String>;

    /// Record a trace on `device_id` using `config`, returning its bytes
    fn record(&self, device_id: &str, config: &[u8]) -> Result<Vec<u8>>;
}

/// [`DeviceBridge`] implemented with the `adb` command-line tool
#[derive(Debug, Clone)]
pub struct AdbBridge {
    adb: PathBuf,
    timeout: Duration,
}

impl AdbBridge {
    /// Bridge using the `adb` binary at `adb`, bounding captures by `timeout`
    pub fn new(adb: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            adb: adb.into(),
            timeout,
        }
    }
}

/// Parse `adb devices` output
///
/// ```text
/// List of devices attached
/// emulator-5554	device
/// 0123456789ABCDEF	unauthorized
/// ```
///
/// Only devices in the `device` state are returned.
pub fn parse_device_list(output: &str) -> Vec<String> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(serial), Some("device")) => Some(serial.to_string()),
                _ => None,
            }
        })
        .collect()
}

impl DeviceBridge for AdbBridge {
    fn list_devices(&self) -> Vec<String> {
        match run_with_deadline(Command::new(&self.adb).arg("devices"), None, LIST_TIMEOUT) {
            Ok(out) if out.status.success() => {
                parse_device_list(&String::from_utf8_lossy(&out.stdout))
            }
            Ok(out) => {
                warn!(status = %out.status, stderr = %out.stderr_text(), "adb devices failed");
                Vec::new()
            }
            Err(e) => {
                warn!(adb = %self.adb.display(), error = %e, "adb unavailable");
                Vec::new()
            }
        }
    }

    fn record(&self, device_id: &str, config: &[u8]) -> Result<Vec<u8>> {
        let mut cmd = Command::new(&self.adb);
        cmd.args(["-s", device_id, "shell", PERFETTO_STREAM]);
        let out = run_with_deadline(&mut cmd, Some(config.to_vec()), self.timeout).map_err(|e| match e {
            ProcessError::TimedOut => Error::Capture(format!(
                "capture on {} exceeded {}s",
                device_id,
                self.timeout.as_secs()
            )),
            other => Error::Capture(format!("adb {}: {}", self.adb.display(), other)),
        })?;
        if !out.status.success() {
            let stderr = out.stderr_text();
            return Err(Error::Capture(if stderr.is_empty() {
                format!("adb exited with {}", out.status)
            } else {
                stderr
            }));
        }
        Ok(out.stdout)
    }
}

/// Capture a trace and publish it as `trace_id`
///
/// Validates the device, records through `bridge`, writes the partial file
/// and renames it to the artifact path. On any failure the partial file is
/// removed and no artifact appears.
pub fn capture_trace(
    bridge: &dyn DeviceBridge,
    artifacts: &TraceArtifacts,
    device_id: &str,
    config_path: &Path,
    trace_id: &TraceId,
) -> Result<PathBuf> {
    let config = fs::read(config_path).map_err(|e| {
        Error::Capture(format!(
            "cannot read capture config {}: {}",
            config_path.display(),
            e
        ))
    })?;

    info!(device = device_id, trace_id = %trace_id, "Starting trace capture");
    let bytes = bridge.record(device_id, &config)?;

    fs::create_dir_all(artifacts.dir())?;
    let partial = artifacts.partial_path(trace_id);
    let target = artifacts.path(trace_id);
    let publish = fs::write(&partial, &bytes).and_then(|_| fs::rename(&partial, &target));
    if let Err(e) = publish {
        let _ = fs::remove_file(&partial);
        return Err(Error::Capture(format!(
            "failed to store trace {}: {}",
            trace_id, e
        )));
    }
    debug!(trace_id = %trace_id, bytes = bytes.len(), path = %target.display(), "Trace published");
    Ok(target)
}
