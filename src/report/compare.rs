//! Comparison of two audits of the same site

use crate::report::model::AuditResult;
use crate::scoring::{round_score, Category, CategoryScores, Grade};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The persisted summary of one audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSnapshot {
    pub domain: String,
    pub timestamp: DateTime<Utc>,
    pub overall_score: f64,
    pub grade: Grade,
    pub issue_count: usize,
    pub category_scores: CategoryScores,
}

impl From<&AuditResult> for AuditSnapshot {
    fn from(result: &AuditResult) -> Self {
        Self {
            domain: result.domain.clone(),
            timestamp: result.timestamp,
            overall_score: result.overall_score,
            grade: result.grade,
            issue_count: result.issues.len(),
            category_scores: result.category_scores,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Improved,
    Regressed,
    Unchanged,
}

impl Direction {
    fn of(diff: f64) -> Self {
        if diff > 0.0 {
            Self::Improved
        } else if diff < 0.0 {
            Self::Regressed
        } else {
            Self::Unchanged
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreChange {
    pub old: f64,
    pub new: f64,
    pub diff: f64,
    pub direction: Direction,
}

impl ScoreChange {
    fn between(old: f64, new: f64) -> Self {
        let diff = round_score(new - old);
        Self {
            old,
            new,
            diff,
            direction: Direction::of(diff),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeChange {
    pub old: Grade,
    pub new: Grade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountChange {
    pub old_count: usize,
    pub new_count: usize,
    pub diff: i64,
}

/// What changed between an older and a newer audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditComparison {
    pub domain: String,
    pub old_timestamp: DateTime<Utc>,
    pub new_timestamp: DateTime<Utc>,
    pub overall_change: ScoreChange,
    pub grade_change: GradeChange,
    pub category_changes: BTreeMap<Category, ScoreChange>,
    pub issues_change: CountChange,
}

/// Compares an older snapshot with a newer one
///
/// Grades are recomputed from the scores so that both sides use the same
/// grade table whatever was stored.
pub fn compare_audits(old: &AuditSnapshot, new: &AuditSnapshot) -> AuditComparison {
    let category_changes = Category::ALL
        .into_iter()
        .map(|c| {
            (
                c,
                ScoreChange::between(old.category_scores.get(c), new.category_scores.get(c)),
            )
        })
        .collect();

    AuditComparison {
        domain: if new.domain.is_empty() {
            old.domain.clone()
        } else {
            new.domain.clone()
        },
        old_timestamp: old.timestamp,
        new_timestamp: new.timestamp,
        overall_change: ScoreChange::between(old.overall_score, new.overall_score),
        grade_change: GradeChange {
            old: Grade::from_score(old.overall_score),
            new: Grade::from_score(new.overall_score),
        },
        category_changes,
        issues_change: CountChange {
            old_count: old.issue_count,
            new_count: new.issue_count,
            diff: new.issue_count as i64 - old.issue_count as i64,
        },
    }
}
