//! Query command handlers
//!
//! ListQueries, AddQuery, DeleteQuery

use tracelab_core::QueryId;
use tracelab_storage::QueryStore;

use crate::{Output, QueryInfo, Result};

/// Handle ListQueries command.
pub fn list_queries(store: &QueryStore) -> Result<Output> {
    let queries = store
        .list_all()?
        .into_iter()
        .map(|(query_id, entry)| QueryInfo {
            query_id,
            name: entry.name,
            is_custom: entry.is_custom,
        })
        .collect();
    Ok(Output::Queries(queries))
}

/// Handle AddQuery command.
pub fn add_query(store: &QueryStore, name: &str, sql: &str) -> Result<Output> {
    let query_id = store.add(name, sql)?;
    Ok(Output::QueryAdded { query_id })
}

/// Handle DeleteQuery command.
pub fn delete_query(store: &QueryStore, query_id: &QueryId) -> Result<Output> {
    store.delete(query_id)?;
    Ok(Output::Unit)
}
