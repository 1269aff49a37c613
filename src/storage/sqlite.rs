//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the AuditStore trait.

use crate::report::AuditSnapshot;
use crate::scoring::{CategoryScores, Grade};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{AuditStore, StorageError, StorageResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const SELECT_COLUMNS: &str =
    "SELECT id, domain, audited_at, overall_score, grade, issue_count, category_scores FROM audits";

/// SQLite audit history backend
pub struct SqliteAuditStore {
    conn: Connection,
}

impl SqliteAuditStore {
    /// Opens or creates the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteAuditStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Raw columns of one `audits` row
struct StoredAudit {
    id: i64,
    domain: String,
    audited_at: String,
    overall_score: f64,
    grade: String,
    issue_count: i64,
    category_scores: String,
}

impl StoredAudit {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            domain: row.get(1)?,
            audited_at: row.get(2)?,
            overall_score: row.get(3)?,
            grade: row.get(4)?,
            issue_count: row.get(5)?,
            category_scores: row.get(6)?,
        })
    }

    fn into_snapshot(self) -> StorageResult<AuditSnapshot> {
        let invalid = |message: String| StorageError::InvalidRecord {
            id: self.id,
            message,
        };

        let timestamp = DateTime::parse_from_rfc3339(&self.audited_at)
            .map_err(|e| invalid(format!("bad timestamp: {}", e)))?
            .with_timezone(&Utc);
        let grade = Grade::parse(&self.grade)
            .ok_or_else(|| invalid(format!("bad grade {:?}", self.grade)))?;
        let category_scores: CategoryScores = serde_json::from_str(&self.category_scores)?;

        Ok(AuditSnapshot {
            domain: self.domain,
            timestamp,
            overall_score: self.overall_score,
            grade,
            issue_count: usize::try_from(self.issue_count).unwrap_or(0),
            category_scores,
        })
    }
}

impl AuditStore for SqliteAuditStore {
    fn save_audit(&mut self, snapshot: &AuditSnapshot) -> StorageResult<i64> {
        let category_scores = serde_json::to_string(&snapshot.category_scores)?;
        self.conn.execute(
            "INSERT INTO audits (domain, audited_at, overall_score, grade, issue_count, category_scores)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                snapshot.domain,
                snapshot.timestamp.to_rfc3339(),
                snapshot.overall_score,
                snapshot.grade.as_str(),
                snapshot.issue_count as i64,
                category_scores,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!("Stored audit {} for {}", id, snapshot.domain);
        Ok(id)
    }

    fn latest_audit(&self, domain: &str) -> StorageResult<Option<AuditSnapshot>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE domain = ?1 ORDER BY audited_at DESC, id DESC LIMIT 1",
            SELECT_COLUMNS
        ))?;

        let stored = stmt
            .query_row(params![domain], StoredAudit::from_row)
            .optional()?;

        stored.map(StoredAudit::into_snapshot).transpose()
    }

    fn audit_history(&self, domain: &str, limit: usize) -> StorageResult<Vec<AuditSnapshot>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE domain = ?1 ORDER BY audited_at DESC, id DESC LIMIT ?2",
            SELECT_COLUMNS
        ))?;

        let rows = stmt.query_map(params![domain, limit as i64], StoredAudit::from_row)?;

        let mut snapshots = Vec::new();
        for row in rows {
            snapshots.push(row?.into_snapshot()?);
        }
        Ok(snapshots)
    }

    fn count_audits(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM audits", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot(domain: &str, day: u32, overall: f64) -> AuditSnapshot {
        AuditSnapshot {
            domain: domain.to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 5, day, 9, 30, 0).unwrap(),
            overall_score: overall,
            grade: Grade::from_score(overall),
            issue_count: 12,
            category_scores: CategoryScores {
                crawlability: 80.0,
                performance: 50.0,
                security: 65.5,
                mobile: 100.0,
                content_quality: 72.0,
                indexability: 85.0,
            },
        }
    }

    #[test]
    fn test_save_and_load_latest() {
        let mut store = SqliteAuditStore::new_in_memory().unwrap();
        store.save_audit(&snapshot("a.com", 1, 71.0)).unwrap();
        store.save_audit(&snapshot("a.com", 3, 78.4)).unwrap();
        store.save_audit(&snapshot("b.com", 4, 90.0)).unwrap();

        let latest = store.latest_audit("a.com").unwrap().unwrap();
        assert_eq!(latest, snapshot("a.com", 3, 78.4));
        assert_eq!(store.count_audits().unwrap(), 3);
    }

    #[test]
    fn test_latest_audit_unknown_domain() {
        let store = SqliteAuditStore::new_in_memory().unwrap();
        assert!(store.latest_audit("nowhere.com").unwrap().is_none());
    }

    #[test]
    fn test_history_newest_first_with_limit() {
        let mut store = SqliteAuditStore::new_in_memory().unwrap();
        for day in 1..=4 {
            store.save_audit(&snapshot("a.com", day, 60.0 + day as f64)).unwrap();
        }

        let history = store.audit_history("a.com", 2).unwrap();
        let scores: Vec<_> = history.iter().map(|s| s.overall_score).collect();
        assert_eq!(scores, vec![64.0, 63.0]);
    }

    #[test]
    fn test_corrupt_grade_is_reported() {
        let store = SqliteAuditStore::new_in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO audits (domain, audited_at, overall_score, grade, issue_count, category_scores)
                 VALUES ('a.com', '2026-05-01T00:00:00+00:00', 50.0, 'Z', 0, '{}')",
                [],
            )
            .unwrap();

        let err = store.latest_audit("a.com").unwrap_err();
        assert!(matches!(err, StorageError::InvalidRecord { .. }));
    }
}
