//! Independent jobs running at the same time

use std::time::Duration;

use crate::common::{FakeEngine, TestLab, WAIT};
use tracelab::{JobStatus, Scalar};

#[tokio::test(flavor = "multi_thread")]
async fn distinct_queries_on_one_trace_do_not_interfere() {
    let t = TestLab::with_engine(FakeEngine::with_delay(Duration::from_millis(100)));
    let trace = t.add_trace(b"shared trace");
    let a = t.lab.add_query("Query A", "SELECT 'a'").unwrap();
    let b = t.lab.add_query("Query B", "SELECT 'b'").unwrap();

    let key_a = t.lab.dispatch(trace.as_str(), a.as_str()).unwrap();
    let key_b = t.lab.dispatch(trace.as_str(), b.as_str()).unwrap();
    let (job_a, job_b) = tokio::join!(t.lab.wait(&key_a, WAIT), t.lab.wait(&key_b, WAIT));
    let (job_a, job_b) = (job_a.unwrap(), job_b.unwrap());

    assert_eq!(job_a.status, JobStatus::Complete);
    assert_eq!(job_b.status, JobStatus::Complete);
    assert_eq!(job_a.data.unwrap().rows()[0][1], Scalar::from("SELECT 'a'"));
    assert_eq!(job_b.data.unwrap().rows()[0][1], Scalar::from("SELECT 'b'"));
}

#[tokio::test(flavor = "multi_thread")]
async fn many_jobs_all_complete_and_are_cached() {
    let t = TestLab::with_engine(FakeEngine::with_delay(Duration::from_millis(20)));
    let traces: Vec<_> = (0..5)
        .map(|i| t.add_trace(format!("trace {}", i).as_bytes()))
        .collect();
    let queries = ["cpu_usage_per_core", "top_10_processes_by_cpu", "android_janky_frames"];

    let mut keys = Vec::new();
    for trace in &traces {
        for query in queries {
            keys.push(t.lab.dispatch(trace.as_str(), query).unwrap());
        }
    }
    for key in &keys {
        let job = t.lab.wait(key, WAIT).await.unwrap();
        assert_eq!(job.status, JobStatus::Complete, "{}", key);
        let table = job.data.unwrap();
        let trace_text = format!("trace {}", traces.iter().position(|t| *t == key.trace_id).unwrap());
        assert_eq!(table.rows()[0][0], Scalar::from(trace_text));
    }
    assert_eq!(t.engine.calls(), 15);
    // every result landed in the cache despite concurrent writers
    assert_eq!(t.lab.executor().cache().len(), 15);
}

#[tokio::test(flavor = "multi_thread")]
async fn racing_dispatches_of_one_key_settle_on_latest() {
    let t = TestLab::with_engine(FakeEngine::with_delay(Duration::from_millis(50)));
    let trace = t.add_trace(b"trace");

    let mut last = None;
    for _ in 0..5 {
        last = Some(t.lab.dispatch(trace.as_str(), "cpu_usage_per_core").unwrap());
    }
    let key = last.unwrap();
    let latest = t.lab.executor().tracker().get(&key).unwrap().dispatch;

    let job = t.lab.wait(&key, WAIT).await.unwrap();
    assert_eq!(job.status, JobStatus::Complete);
    assert_eq!(job.dispatch, latest);
}
