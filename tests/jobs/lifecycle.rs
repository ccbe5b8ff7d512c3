//! Job lifecycle: not found → pending/processing → terminal

use std::time::Duration;

use crate::common::{FakeEngine, TestLab, WAIT};
use tracelab::JobStatus;

#[tokio::test(flavor = "multi_thread")]
async fn poll_before_dispatch_is_not_found() {
    let t = TestLab::new();
    let trace = t.add_trace(b"trace");
    let err = t.lab.poll(trace.as_str(), "cpu_usage_per_core").unwrap_err();
    assert_eq!(err.error_code(), "NotFound");
}

#[tokio::test(flavor = "multi_thread")]
async fn dispatch_is_observable_before_it_finishes() {
    let t = TestLab::with_engine(FakeEngine::with_delay(Duration::from_millis(300)));
    let trace = t.add_trace(b"trace");

    let key = t.lab.dispatch(trace.as_str(), "cpu_usage_per_core").unwrap();
    let view = t.lab.poll(trace.as_str(), "cpu_usage_per_core").unwrap();
    assert!(
        matches!(view.status, JobStatus::Pending | JobStatus::Processing),
        "got {:?}",
        view.status
    );
    assert!(view.data.is_none());

    let job = t.lab.wait(&key, WAIT).await.unwrap();
    assert_eq!(job.status, JobStatus::Complete);

    // terminal state sticks until the next dispatch
    tokio::time::sleep(Duration::from_millis(50)).await;
    let view = t.lab.poll(trace.as_str(), "cpu_usage_per_core").unwrap();
    assert_eq!(view.status, JobStatus::Complete);
}

#[tokio::test(flavor = "multi_thread")]
async fn redispatch_replaces_terminal_state() {
    let t = TestLab::with_engine(FakeEngine::with_delay(Duration::from_millis(200)));
    let trace = t.add_trace(b"v1");
    let key = t.lab.dispatch(trace.as_str(), "android_janky_frames").unwrap();
    let first = t.lab.wait(&key, WAIT).await.unwrap();
    assert_eq!(first.status, JobStatus::Complete);

    // a re-captured trace cannot be served from the cache
    t.write_trace(&trace, b"v2, re-captured");
    t.lab.dispatch(trace.as_str(), "android_janky_frames").unwrap();
    let view = t.lab.poll(trace.as_str(), "android_janky_frames").unwrap();
    assert!(matches!(view.status, JobStatus::Pending | JobStatus::Processing));

    let second = t.lab.wait(&key, WAIT).await.unwrap();
    assert!(second.dispatch > first.dispatch);
    assert!(!second.cached);
    assert_ne!(second.fingerprint, first.fingerprint);
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_trace_creates_no_job() {
    let t = TestLab::new();
    let err = t.lab.dispatch("abc", "cpu_usage_per_core").unwrap_err();
    assert_eq!(err.error_code(), "ArtifactNotFound");
    assert!(err.is_retryable());
    assert!(t.lab.poll("abc", "cpu_usage_per_core").unwrap_err().is_not_found());
    assert_eq!(t.engine.calls(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn partial_capture_is_not_ready() {
    let t = TestLab::new();
    let partial = t.lab.config().traces_dir().join("abc.pftrace.partial");
    std::fs::write(partial, b"half").unwrap();
    let err = t.lab.dispatch("abc", "cpu_usage_per_core").unwrap_err();
    assert!(err.is_not_ready());
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_query_is_not_found() {
    let t = TestLab::new();
    let trace = t.add_trace(b"trace");
    let err = t.lab.dispatch(trace.as_str(), "no_such_query").unwrap_err();
    assert_eq!(err.error_code(), "NotFound");
    assert!(t.lab.poll(trace.as_str(), "no_such_query").is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn engine_error_is_recorded_on_the_job() {
    let t = TestLab::new();
    let trace = t.add_trace(b"trace");
    let query = t.lab.add_query("Broken", "SELECT FAIL").unwrap();

    let key = t.lab.dispatch(trace.as_str(), query.as_str()).unwrap();
    let job = t.lab.wait(&key, WAIT).await.unwrap();
    assert_eq!(job.status, JobStatus::Error);

    let view = t.lab.poll(trace.as_str(), query.as_str()).unwrap();
    assert_eq!(view.error_code.as_deref(), Some("EngineError"));
    assert!(view.error.unwrap().contains("syntax error"));
    assert!(view.data.is_none());

    // failures are not cached; the next run starts the engine again
    let key = t.lab.dispatch(trace.as_str(), query.as_str()).unwrap();
    t.lab.wait(&key, WAIT).await.unwrap();
    assert_eq!(t.engine.calls(), 2);
}
