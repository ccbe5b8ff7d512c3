//! Content-addressed result cache
//!
//! Maps a [`Fingerprint`] over (trace content, query text) to the table the
//! engine produced. Entries are immutable: storing under a key that is
//! already present keeps the original entry.
//!
//! The cache is best-effort. An unreadable or corrupt file reads as an empty
//! cache; a failed write is reported to the caller, which still owns the
//! freshly computed table.
//!
//! ## Bounding
//!
//! Unbounded by default. With `max_entries` set, each store that pushes the
//! entry count past the bound evicts the oldest entries by `stored_at`.

use crate::document::JsonDocument;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracelab_core::{Fingerprint, QueryTable, Result, Scalar};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredResult {
    columns: Vec<String>,
    rows: Vec<Vec<Scalar>>,
    stored_at: DateTime<Utc>,
}

/// A cached query result
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Cache key
    pub key: Fingerprint,
    /// Result table
    pub table: QueryTable,
    /// When the entry was written
    pub stored_at: DateTime<Utc>,
}

/// Persistent result cache
pub struct ResultCache {
    doc: JsonDocument<BTreeMap<Fingerprint, StoredResult>>,
    max_entries: Option<usize>,
}

impl ResultCache {
    /// Open an unbounded cache backed by `path`
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            doc: JsonDocument::new(path),
            max_entries: None,
        }
    }

    /// Bound the number of entries kept
    pub fn with_max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Look up a result by fingerprint
    ///
    /// An unreadable cache file is a miss.
    pub fn lookup(&self, key: &Fingerprint) -> Option<CacheEntry> {
        let stored = match self.doc.read(|entries| entries.get(key).cloned()) {
            Ok(stored) => stored?,
            Err(e) => {
                warn!(fingerprint = %key.short(), error = %e, "Result cache unreadable, treating as miss");
                return None;
            }
        };
        match QueryTable::new(stored.columns, stored.rows) {
            Ok(table) => Some(CacheEntry {
                key: *key,
                table,
                stored_at: stored.stored_at,
            }),
            Err(e) => {
                warn!(fingerprint = %key.short(), error = %e, "Discarding malformed cache entry");
                None
            }
        }
    }

    /// Store a result
    ///
    /// Idempotent: an existing entry under `key` is left untouched and
    /// nothing is rewritten. Returns whether a new entry was written.
    pub fn store(&self, key: Fingerprint, table: &QueryTable) -> Result<bool> {
        let max_entries = self.max_entries;
        let (inserted, evicted) = self.doc.update(|entries| {
            if entries.contains_key(&key) {
                return ((false, 0), false);
            }
            entries.insert(
                key,
                StoredResult {
                    columns: table.columns().to_vec(),
                    rows: table.rows().to_vec(),
                    stored_at: Utc::now(),
                },
            );
            let evicted = match max_entries {
                Some(max) => evict_oldest(entries, max, &key),
                None => 0,
            };
            ((true, evicted), true)
        })?;
        if inserted {
            debug!(fingerprint = %key.short(), evicted, "Result cached");
        }
        Ok(inserted)
    }

    /// Number of cached entries, zero if the cache file is unreadable
    pub fn len(&self) -> usize {
        self.doc.read(|entries| entries.len()).unwrap_or(0)
    }

    /// Check if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drop the oldest entries until at most `max` remain, never dropping `keep`
fn evict_oldest(
    entries: &mut BTreeMap<Fingerprint, StoredResult>,
    max: usize,
    keep: &Fingerprint,
) -> usize {
    let max = max.max(1);
    if entries.len() <= max {
        return 0;
    }
    let mut by_age: Vec<(DateTime<Utc>, Fingerprint)> = entries
        .iter()
        .filter(|(k, _)| *k != keep)
        .map(|(k, v)| (v.stored_at, *k))
        .collect();
    by_age.sort();

    let excess = entries.len() - max;
    for (_, k) in by_age.into_iter().take(excess) {
        entries.remove(&k);
    }
    excess
}
