//! Scoring engine
//!
//! Turns the raw findings of an audit into six category scores, a weighted
//! overall score and a letter grade.

pub mod rules;
mod types;

pub use rules::NEUTRAL_SCORE;
pub use types::{Category, CategoryScores, Grade};

use crate::report::AuditFindings;
use serde::{Deserialize, Serialize};

/// Category scores, overall score and grade of one audit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub categories: CategoryScores,
    pub overall: f64,
    pub grade: Grade,
}

/// Rounds a score to one decimal
pub fn round_score(score: f64) -> f64 {
    (score * 10.0).round() / 10.0
}

/// Scores every category and derives the overall score and grade
///
/// The overall score is the weighted sum of the unrounded category scores,
/// clamped and then rounded; the grade is computed from that rounded value.
pub fn score_audit(findings: &AuditFindings) -> Scorecard {
    let raw = CategoryScores {
        crawlability: rules::crawlability(findings),
        performance: rules::performance(findings),
        security: rules::security(findings),
        mobile: rules::mobile(findings),
        content_quality: rules::content_quality(findings),
        indexability: rules::indexability(findings),
    };

    let overall = round_score(rules::clamp_score(raw.weighted_total()));
    let categories = CategoryScores {
        crawlability: round_score(raw.crawlability),
        performance: round_score(raw.performance),
        security: round_score(raw.security),
        mobile: round_score(raw.mobile),
        content_quality: round_score(raw.content_quality),
        indexability: round_score(raw.indexability),
    };

    tracing::info!("Overall score {} ({})", overall, Grade::from_score(overall));
    Scorecard {
        categories,
        overall,
        grade: Grade::from_score(overall),
    }
}
