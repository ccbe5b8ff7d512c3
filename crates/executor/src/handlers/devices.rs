//! Device command handlers
//!
//! ListDevices, StartCapture, and the awaited capture behind
//! [`crate::Executor::capture`]

use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Handle;
use tracelab_core::{Error, TraceId};
use tracelab_engine::{capture_trace, DeviceBridge, TraceArtifacts};
use tracing::{error, info};

use crate::{Output, Result};

/// Handle ListDevices command.
pub fn list_devices(bridge: &dyn DeviceBridge) -> Result<Output> {
    Ok(Output::Devices(bridge.list_devices()))
}

/// The trimmed device id, if that device is connected
fn connected_device(bridge: &dyn DeviceBridge, device_id: &str) -> Result<String> {
    let device_id = device_id.trim();
    if device_id.is_empty() {
        return Err(Error::Validation("device id must not be empty".into()));
    }
    if !bridge.list_devices().iter().any(|d| d == device_id) {
        return Err(Error::NotFound(format!("device {}", device_id)));
    }
    Ok(device_id.to_string())
}

/// Handle StartCapture command.
///
/// Checks the device is connected, then records on the blocking pool. The
/// trace id is returned immediately; the artifact appears only once the
/// capture succeeds, and failures are logged. The capture is lost if the
/// process exits first.
pub fn start_capture(
    runtime: &Handle,
    bridge: &Arc<dyn DeviceBridge>,
    artifacts: &Arc<TraceArtifacts>,
    capture_config: PathBuf,
    device_id: &str,
) -> Result<Output> {
    let device = connected_device(bridge.as_ref(), device_id)?;

    let trace_id = TraceId::new();
    let bridge = Arc::clone(bridge);
    let artifacts = Arc::clone(artifacts);
    let id = trace_id.clone();
    runtime.spawn_blocking(move || {
        match capture_trace(bridge.as_ref(), &artifacts, &device, &capture_config, &id) {
            Ok(path) => info!(device = %device, trace_id = %id, path = %path.display(), "Capture complete"),
            Err(e) => error!(device = %device, trace_id = %id, error = %e, "Capture failed"),
        }
    });
    Ok(Output::CaptureStarted { trace_id })
}

/// Record a trace and wait until it is published.
///
/// Same checks as [`start_capture`]; capture failures are returned instead
/// of logged.
pub async fn capture(
    runtime: &Handle,
    bridge: &Arc<dyn DeviceBridge>,
    artifacts: &Arc<TraceArtifacts>,
    capture_config: PathBuf,
    device_id: &str,
) -> Result<TraceId> {
    let device = connected_device(bridge.as_ref(), device_id)?;

    let trace_id = TraceId::new();
    let bridge = Arc::clone(bridge);
    let artifacts = Arc::clone(artifacts);
    let id = trace_id.clone();
    let path = runtime
        .spawn_blocking(move || {
            capture_trace(bridge.as_ref(), &artifacts, &device, &capture_config, &id)
        })
        .await
        .map_err(|e| Error::Internal(format!("capture task failed: {}", e)))??;
    info!(trace_id = %trace_id, path = %path.display(), "Capture complete");
    Ok(trace_id)
}
