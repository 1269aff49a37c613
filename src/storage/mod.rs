//! Storage module for persisting audit history
//!
//! Each finished audit is stored as an [`AuditSnapshot`] so a later audit of
//! the same domain can be compared against it.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteAuditStore;
pub use traits::{AuditStore, StorageError, StorageResult};

use crate::report::AuditSnapshot;
use std::path::Path;

/// Initializes or opens an audit store
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteAuditStore)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_store(path: &Path) -> StorageResult<SqliteAuditStore> {
    SqliteAuditStore::new(path)
}

/// Saves a snapshot and returns the one stored before it, if any
pub fn record_audit(
    store: &mut dyn AuditStore,
    snapshot: &AuditSnapshot,
) -> StorageResult<Option<AuditSnapshot>> {
    let previous = store.latest_audit(&snapshot.domain)?;
    store.save_audit(snapshot)?;
    tracing::info!(
        "Audit for {} stored ({} previous)",
        snapshot.domain,
        if previous.is_some() { "with" } else { "no" }
    );
    Ok(previous)
}
