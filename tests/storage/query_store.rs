//! Query store persistence

use std::sync::Arc;

use proptest::prelude::*;
use tracelab::storage::QueryStore;
use tracelab::QueryId;

fn store() -> (tempfile::TempDir, QueryStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = QueryStore::open(dir.path().join("cache/custom_queries.json"));
    (dir, store)
}

#[test]
fn custom_queries_survive_reopen() {
    let (dir, store) = store();
    store.add("Slow Frames", "SELECT 1").unwrap();
    drop(store);

    let reopened = QueryStore::open(dir.path().join("cache/custom_queries.json"));
    assert_eq!(reopened.get(&QueryId::from("slow_frames")).unwrap().as_deref(), Some("SELECT 1"));
}

#[test]
fn corrupt_file_reads_as_empty_and_is_repaired() {
    let (dir, store) = store();
    let path = dir.path().join("cache/custom_queries.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"{ not json").unwrap();

    // predefined queries remain available
    assert_eq!(store.list_all().unwrap().len(), 3);
    store.add("Slow Frames", "SELECT 1").unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["slow_frames"]["sql"], "SELECT 1");
}

#[test]
fn unreadable_file_is_reported_and_left_in_place() {
    let (dir, store) = store();
    // a directory where the store file belongs cannot be read as a file
    let path = dir.path().join("cache/custom_queries.json");
    std::fs::create_dir_all(path.join("backup")).unwrap();

    let err = store.get(&QueryId::from("cpu_usage_per_core")).unwrap_err();
    assert_eq!(err.error_code(), "StorageError");
    assert!(store.list_all().is_err());
    assert!(store.add("Slow Frames", "SELECT 1").is_err());
    assert!(path.join("backup").is_dir());
}

#[test]
fn custom_shadows_predefined_until_deleted() {
    let (_dir, store) = store();
    let id = QueryId::from("cpu_usage_per_core");
    let builtin = store.get(&id).unwrap().unwrap();

    store.add("CPU usage per core", "SELECT 42").unwrap();
    assert_eq!(store.get(&id).unwrap().as_deref(), Some("SELECT 42"));
    assert!(store.list_all().unwrap()[&id].is_custom);

    assert!(store.delete(&id).unwrap());
    assert_eq!(store.get(&id).unwrap(), Some(builtin));
    // predefined queries cannot be deleted
    assert!(!store.delete(&id).unwrap());
    assert!(store.get(&id).unwrap().is_some());
}

#[test]
fn concurrent_adds_are_not_lost() {
    let (_dir, store) = store();
    let store = Arc::new(store);
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for j in 0..5 {
                    store
                        .add(&format!("query {} {}", i, j), "SELECT 1")
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    let custom = store.list_all().unwrap().values().filter(|q| q.is_custom).count();
    assert_eq!(custom, 40);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn added_query_resolves_under_returned_id(name in "[A-Za-z0-9 _.-]{1,24}", sql in "SELECT [a-z0-9]{1,12}") {
        prop_assume!(name.chars().any(|c| c.is_ascii_alphanumeric()));
        let (_dir, store) = store();
        let id = store.add(&name, &sql).unwrap();
        prop_assert_eq!(store.get(&id).unwrap(), Some(sql));
        prop_assert!(id.as_str().chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
        prop_assert!(!id.as_str().starts_with('_') && !id.as_str().ends_with('_'));
    }
}
