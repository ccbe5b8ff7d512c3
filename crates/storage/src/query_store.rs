//! Named query store
//!
//! Custom queries persist in one JSON document, keyed by derived id:
//!
//! ```json
//! {
//!   "slow_frames": { "name": "Slow Frames", "sql": "SELECT ...", "custom": true }
//! }
//! ```
//!
//! Lookups merge the custom set over the predefined queries; a custom query
//! whose id matches a predefined one shadows it.

use crate::document::JsonDocument;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracelab_core::{predefined_queries, NamedQuery, QueryId, Result};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredQuery {
    name: String,
    sql: String,
    #[serde(default = "default_custom")]
    custom: bool,
}

fn default_custom() -> bool {
    true
}

/// One entry of [`QueryStore::list_all`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryEntry {
    /// Display name
    pub name: String,
    /// SQL text
    pub sql_text: String,
    /// `false` for built-in queries
    pub is_custom: bool,
}

/// Store of predefined and custom named queries
pub struct QueryStore {
    doc: JsonDocument<BTreeMap<String, StoredQuery>>,
}

impl QueryStore {
    /// Open the store backed by `path`
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            doc: JsonDocument::new(path),
        }
    }

    /// Save a custom query, replacing any query with the same derived id
    ///
    /// # Errors
    ///
    /// - `Validation` if the name or SQL text is empty
    /// - `Storage` if the store cannot be written
    pub fn add(&self, name: &str, sql_text: &str) -> Result<QueryId> {
        let query = NamedQuery::new(name, sql_text)?;
        let id = query.id.clone();
        let replaced = self.doc.update(|queries| {
            let previous = queries.insert(
                query.id.as_str().to_string(),
                StoredQuery {
                    name: query.name,
                    sql: query.sql_text,
                    custom: true,
                },
            );
            (previous.is_some(), true)
        })?;
        info!(query_id = %id, replaced, "Custom query saved");
        Ok(id)
    }

    /// Remove a custom query
    ///
    /// Unknown ids and predefined ids are a no-op. Returns whether a custom
    /// query was removed.
    pub fn delete(&self, query_id: &QueryId) -> Result<bool> {
        let removed = self.doc.update(|queries| {
            let removed = queries.remove(query_id.as_str()).is_some();
            (removed, removed)
        })?;
        if removed {
            info!(query_id = %query_id, "Custom query deleted");
        }
        Ok(removed)
    }

    /// Resolve a query id to its SQL text, `None` if no query has that id
    ///
    /// # Errors
    ///
    /// `Storage` if the store exists but cannot be read.
    pub fn get(&self, query_id: &QueryId) -> Result<Option<String>> {
        let custom = self
            .doc
            .read(|queries| queries.get(query_id.as_str()).map(|q| q.sql.clone()))?;
        Ok(custom.or_else(|| {
            predefined_queries()
                .iter()
                .find(|q| q.id == query_id.as_str())
                .map(|q| q.sql.to_string())
        }))
    }

    /// All queries, predefined merged with custom, ordered by id
    ///
    /// # Errors
    ///
    /// `Storage` if the store exists but cannot be read.
    pub fn list_all(&self) -> Result<BTreeMap<QueryId, QueryEntry>> {
        let mut all: BTreeMap<QueryId, QueryEntry> = predefined_queries()
            .iter()
            .map(|q| {
                (
                    QueryId::from(q.id),
                    QueryEntry {
                        name: q.name.to_string(),
                        sql_text: q.sql.to_string(),
                        is_custom: false,
                    },
                )
            })
            .collect();
        self.doc.read(|queries| {
            for (id, q) in queries {
                all.insert(
                    QueryId::from(id.as_str()),
                    QueryEntry {
                        name: q.name.clone(),
                        sql_text: q.sql.clone(),
                        is_custom: q.custom,
                    },
                );
            }
        })?;
        Ok(all)
    }
}
