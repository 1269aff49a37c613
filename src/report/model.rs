//! Audit result model

use crate::checks::{BrokenLinkRecord, ContentIssue, MobileReport, RedirectChain, SecurityReport};
use crate::crawler::PageRecord;
use crate::providers::{Recommendation, SpeedReport};
use crate::report::summary::CrawlSummary;
use crate::robots::RobotsPolicy;
use crate::scoring::{Category, CategoryScores, Grade};
use crate::sitemap::SitemapReport;
use crate::CheckResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a reported issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single problem found by the audit, in uniform shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub category: Category,
    pub description: String,
    pub how_to_fix: String,
    pub affected_url: String,
}

/// Outcome of an optional check
///
/// Serialized with a `status` tag; a failed check carries its error text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckOutcome<T> {
    Completed(T),
    Failed { error: String },
    Skipped,
}

impl<T> Default for CheckOutcome<T> {
    fn default() -> Self {
        Self::Skipped
    }
}

impl<T> CheckOutcome<T> {
    /// Converts a check result, logging a failure
    pub fn from_result(check: &str, result: CheckResult<T>) -> Self {
        match result {
            Ok(value) => Self::Completed(value),
            Err(e) => {
                tracing::warn!("{} check failed: {}", check, e);
                Self::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    pub fn as_completed(&self) -> Option<&T> {
        match self {
            Self::Completed(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// Raw findings of every stage, before scoring
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditFindings {
    pub pages: Vec<PageRecord>,
    #[serde(rename = "robots_data")]
    pub robots: RobotsPolicy,
    #[serde(rename = "sitemap_data")]
    pub sitemap: SitemapReport,
    pub broken_links: Vec<BrokenLinkRecord>,
    pub redirect_chains: Vec<RedirectChain>,
    pub content_issues: Vec<ContentIssue>,
    pub speed_data: CheckOutcome<SpeedReport>,
    pub security_data: CheckOutcome<SecurityReport>,
    pub mobile_data: CheckOutcome<MobileReport>,
}

/// The complete result of one audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    pub domain: String,
    /// Seed URL the audit started from
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub category_scores: CategoryScores,
    pub overall_score: f64,
    pub grade: Grade,
    pub issues: Vec<Issue>,
    pub passed_checks: Vec<String>,
    pub crawl_summary: CrawlSummary,
    #[serde(flatten)]
    pub findings: AuditFindings,
    pub recommendations: Vec<Recommendation>,
    pub elapsed_seconds: f64,
}

impl AuditResult {
    /// Number of issues with the given severity
    pub fn count_severity(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    /// Issues of one category
    pub fn issues_in(&self, category: Category) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.category == category)
    }
}
