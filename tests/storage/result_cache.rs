//! Result cache persistence

use std::sync::Arc;

use tracelab::storage::ResultCache;
use tracelab::{Fingerprint, QueryTable, Scalar, TraceDigest};

fn table(value: i64) -> QueryTable {
    QueryTable::new(
        vec!["cpu".into(), "dur".into(), "name".into()],
        vec![
            vec![Scalar::Int(value), Scalar::Float(0.5), Scalar::from("RenderThread")],
            vec![Scalar::Int(1), Scalar::Null, Scalar::from("a \"quoted\" name")],
        ],
    )
    .unwrap()
}

fn key(trace: &[u8], query: &str) -> Fingerprint {
    Fingerprint::derive(&TraceDigest::of_bytes(trace), query)
}

#[test]
fn entries_survive_reopen_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache/query_results.json");
    let cache = ResultCache::open(&path);
    assert!(cache.store(key(b"t", "q"), &table(0)).unwrap());
    drop(cache);

    let reopened = ResultCache::open(&path);
    let entry = reopened.lookup(&key(b"t", "q")).unwrap();
    assert_eq!(entry.table, table(0));
}

#[test]
fn first_write_wins() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ResultCache::open(dir.path().join("query_results.json"));
    let k = key(b"t", "q");
    assert!(cache.store(k, &table(0)).unwrap());
    assert!(!cache.store(k, &table(7)).unwrap());
    assert_eq!(cache.lookup(&k).unwrap().table, table(0));
    assert_eq!(cache.len(), 1);
}

#[test]
fn one_byte_change_misses() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ResultCache::open(dir.path().join("query_results.json"));
    cache.store(key(b"trace", "SELECT 1"), &table(0)).unwrap();

    assert!(cache.lookup(&key(b"trace", "SELECT 1")).is_some());
    assert!(cache.lookup(&key(b"tracf", "SELECT 1")).is_none());
    assert!(cache.lookup(&key(b"trace", "SELECT 2")).is_none());
}

#[test]
fn corrupt_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("query_results.json");
    std::fs::write(&path, b"[1, 2").unwrap();
    let cache = ResultCache::open(&path);
    assert!(cache.is_empty());
    assert!(cache.store(key(b"t", "q"), &table(0)).unwrap());
    assert_eq!(cache.len(), 1);
}

#[test]
fn concurrent_stores_are_not_lost() {
    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(ResultCache::open(dir.path().join("query_results.json")));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                for j in 0..5 {
                    let query = format!("SELECT {} {}", i, j);
                    cache.store(key(b"trace", &query), &table(i)).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(cache.len(), 40);
}

#[test]
fn bounded_cache_keeps_newest() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ResultCache::open(dir.path().join("query_results.json")).with_max_entries(Some(2));
    for i in 0..4 {
        cache.store(key(b"t", &format!("q{}", i)), &table(i)).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    assert_eq!(cache.len(), 2);
    assert!(cache.lookup(&key(b"t", "q0")).is_none());
    assert!(cache.lookup(&key(b"t", "q3")).is_some());
}
