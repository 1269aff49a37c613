//! Audit result model, issue compiler, crawl summary and audit comparison

mod compare;
mod issues;
mod model;
mod summary;

pub use compare::{
    compare_audits, AuditComparison, AuditSnapshot, CountChange, Direction, GradeChange,
    ScoreChange,
};
pub use issues::{compile_issues, compile_passed_checks};
pub use model::{AuditFindings, AuditResult, CheckOutcome, Issue, Severity};
pub use summary::CrawlSummary;
