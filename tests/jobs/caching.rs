//! Result caching through the job tracker

use crate::common::{open_lab, FakeEngine, TestLab, WAIT};
use std::sync::Arc;
use tracelab::{JobStatus, Scalar};

#[tokio::test(flavor = "multi_thread")]
async fn same_trace_and_query_runs_engine_once() {
    let t = TestLab::new();
    let trace = t.add_trace(b"trace");

    let key = t.lab.dispatch(trace.as_str(), "cpu_usage_per_core").unwrap();
    let first = t.lab.wait(&key, WAIT).await.unwrap();
    let key = t.lab.dispatch(trace.as_str(), "cpu_usage_per_core").unwrap();
    let second = t.lab.wait(&key, WAIT).await.unwrap();

    assert_eq!(t.engine.calls(), 1);
    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(first.data, second.data);
}

#[tokio::test(flavor = "multi_thread")]
async fn identical_bytes_under_another_id_share_results() {
    let t = TestLab::new();
    let a = t.add_trace(b"same bytes");
    let b = t.add_trace(b"same bytes");

    let key = t.lab.dispatch(a.as_str(), "cpu_usage_per_core").unwrap();
    t.lab.wait(&key, WAIT).await.unwrap();
    let key = t.lab.dispatch(b.as_str(), "cpu_usage_per_core").unwrap();
    let job = t.lab.wait(&key, WAIT).await.unwrap();

    assert!(job.cached);
    assert_eq!(t.engine.calls(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn editing_the_query_runs_again() {
    let t = TestLab::new();
    let trace = t.add_trace(b"trace");
    let query = t.lab.add_query("Frames", "SELECT 1").unwrap();

    let key = t.lab.dispatch(trace.as_str(), query.as_str()).unwrap();
    t.lab.wait(&key, WAIT).await.unwrap();

    t.lab.add_query("Frames", "SELECT 1 ").unwrap();
    let key = t.lab.dispatch(trace.as_str(), query.as_str()).unwrap();
    let job = t.lab.wait(&key, WAIT).await.unwrap();

    assert!(!job.cached);
    assert_eq!(t.engine.calls(), 2);
    assert_eq!(job.data.unwrap().rows()[0][1], Scalar::from("SELECT 1 "));
}

#[tokio::test(flavor = "multi_thread")]
async fn cache_survives_restart() {
    let t = TestLab::new();
    let trace = t.add_trace(b"trace");
    let key = t.lab.dispatch(trace.as_str(), "top_10_processes_by_cpu").unwrap();
    let first = t.lab.wait(&key, WAIT).await.unwrap();
    assert_eq!(first.status, JobStatus::Complete);

    let engine = Arc::new(FakeEngine::new());
    let reopened = open_lab(&t.data_dir(), engine.clone());
    let key = reopened.dispatch(trace.as_str(), "top_10_processes_by_cpu").unwrap();
    let job = reopened.wait(&key, WAIT).await.unwrap();

    assert!(job.cached);
    assert_eq!(job.data, first.data);
    assert_eq!(job.fingerprint, first.fingerprint);
    assert_eq!(engine.calls(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn unwritable_cache_still_completes_job() {
    let t = TestLab::new();
    let trace = t.add_trace(b"trace");
    // a directory where the cache file should be makes every store fail
    let results = t.lab.config().query_results_path();
    std::fs::create_dir_all(&results).unwrap();

    let key = t.lab.dispatch(trace.as_str(), "cpu_usage_per_core").unwrap();
    let job = t.lab.wait(&key, WAIT).await.unwrap();
    assert_eq!(job.status, JobStatus::Complete);
    assert!(job.data.is_some());
}
