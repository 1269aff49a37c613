//! Storage traits and error types
//!
//! This module defines the trait interface for audit history backends and
//! associated error types.

use crate::report::AuditSnapshot;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid stored audit {id}: {message}")]
    InvalidRecord { id: i64, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for audit history backends
///
/// Only the snapshot of an audit is stored: domain, timestamp, overall
/// score, grade, issue count and category scores.
pub trait AuditStore {
    /// Stores a snapshot
    ///
    /// # Returns
    ///
    /// The ID of the stored snapshot
    fn save_audit(&mut self, snapshot: &AuditSnapshot) -> StorageResult<i64>;

    /// Gets the most recent snapshot for a domain
    fn latest_audit(&self, domain: &str) -> StorageResult<Option<AuditSnapshot>>;

    /// Gets up to `limit` snapshots for a domain, newest first
    fn audit_history(&self, domain: &str, limit: usize) -> StorageResult<Vec<AuditSnapshot>>;

    /// Counts stored snapshots across all domains
    fn count_audits(&self) -> StorageResult<u64>;
}
