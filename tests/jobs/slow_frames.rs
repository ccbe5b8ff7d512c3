//! The operator workflow end to end: add a query, run it, run it again.

use std::time::Duration;

use crate::common::{FakeEngine, TestLab, WAIT};
use tracelab::{JobStatus, Scalar, TraceId};

const SLOW_FRAMES_SQL: &str =
    "SELECT ts, dur, name FROM actual_frame_timeline_slice WHERE dur > 16666666";

#[tokio::test(flavor = "multi_thread")]
async fn slow_frames_run_then_cached_rerun() {
    let t = TestLab::with_engine(FakeEngine::with_delay(Duration::from_millis(200)));
    let trace = TraceId::parse("abc").unwrap();
    t.write_trace(&trace, b"perfetto trace abc");

    let query = t.lab.add_query("Slow Frames", SLOW_FRAMES_SQL).unwrap();
    assert_eq!(query.as_str(), "slow_frames");

    let key = t.lab.dispatch("abc", "slow_frames").unwrap();
    assert_eq!(key.to_string(), "abc/slow_frames");
    let status = t.lab.poll("abc", "slow_frames").unwrap().status;
    assert!(matches!(status, JobStatus::Pending | JobStatus::Processing));

    t.lab.wait(&key, WAIT).await.unwrap();
    let first = t.lab.poll("abc", "slow_frames").unwrap();
    assert_eq!(first.status, JobStatus::Complete);
    assert!(!first.cached);
    let table = first.data.clone().unwrap();
    assert_eq!(table.columns(), ["trace", "query"]);
    assert_eq!(
        table.rows(),
        [vec![Scalar::from("perfetto trace abc"), Scalar::from(SLOW_FRAMES_SQL)]]
    );

    // the re-run is answered from the cache before dispatch returns
    t.lab.dispatch("abc", "slow_frames").unwrap();
    let second = t.lab.poll("abc", "slow_frames").unwrap();
    assert_eq!(second.status, JobStatus::Complete);
    assert!(second.cached);
    assert_eq!(
        serde_json::to_vec(&second.data).unwrap(),
        serde_json::to_vec(&first.data).unwrap()
    );
    assert_eq!(t.engine.calls(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn readding_query_replaces_it() {
    let t = TestLab::new();
    t.lab.add_query("Slow Frames", "SELECT 1").unwrap();
    t.lab.add_query("slow   frames!", "SELECT 2").unwrap();

    let queries = t.lab.list_queries().unwrap();
    let matching: Vec<_> = queries
        .iter()
        .filter(|q| q.query_id.as_str() == "slow_frames")
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].name, "slow   frames!");
}
