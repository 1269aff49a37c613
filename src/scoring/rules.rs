//! Per-category penalty rules
//!
//! Every category starts at 100 and loses capped penalties. The results are
//! clamped to [0, 100] but not rounded here.

use crate::checks::{issues_of, ContentIssueKind};
use crate::report::{AuditFindings, CheckOutcome};

/// Score used for a category whose check did not complete
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Security headers whose absence costs points, by report label
const CRITICAL_HEADERS: &[&str] = &["HSTS", "X-Content-Type-Options", "X-Frame-Options"];

fn capped(count: usize, per_item: f64, cap: f64) -> f64 {
    (count as f64 * per_item).min(cap)
}

pub fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

pub fn crawlability(findings: &AuditFindings) -> f64 {
    let pages = &findings.pages;
    if pages.is_empty() {
        return 0.0;
    }

    let mut score = 100.0;

    let broken_ratio = findings.broken_links.len() as f64 / pages.len() as f64;
    score -= (broken_ratio * 100.0).min(30.0);

    let long_chains = findings
        .redirect_chains
        .iter()
        .filter(|c| c.chain_length > 1)
        .count();
    score -= capped(long_chains, 3.0, 20.0);

    let loops = findings.redirect_chains.iter().filter(|c| c.is_loop).count();
    score -= loops as f64 * 10.0;

    if !findings.robots.exists {
        score -= 5.0;
    }
    if !findings.sitemap.found {
        score -= 10.0;
    }

    let error_pages = pages.iter().filter(|p| p.status_code >= 400).count();
    score -= capped(error_pages, 5.0, 20.0);

    clamp_score(score)
}

pub fn performance(findings: &AuditFindings) -> f64 {
    let CheckOutcome::Completed(speed) = &findings.speed_data else {
        return NEUTRAL_SCORE;
    };

    let mut score =
        speed.mobile.performance_score * 0.6 + speed.desktop.performance_score * 0.4;

    if let Some(lcp) = speed.mobile.lcp {
        if lcp > 4000.0 {
            score -= 10.0;
        } else if lcp > 2500.0 {
            score -= 5.0;
        }
    }
    if speed.mobile.cls.is_some_and(|cls| cls > 0.25) {
        score -= 10.0;
    }

    clamp_score(score)
}

pub fn security(findings: &AuditFindings) -> f64 {
    let CheckOutcome::Completed(security) = &findings.security_data else {
        return NEUTRAL_SCORE;
    };

    let mut score = 100.0;
    if !security.ssl_valid {
        score -= 40.0;
    }
    if !security.https_enforced {
        score -= 15.0;
    }
    score -= capped(security.mixed_content.len(), 5.0, 15.0);

    for header in CRITICAL_HEADERS {
        if !security.has_header(header) {
            score -= 10.0;
        }
    }

    clamp_score(score)
}

pub fn mobile(findings: &AuditFindings) -> f64 {
    let CheckOutcome::Completed(mobile) = &findings.mobile_data else {
        return NEUTRAL_SCORE;
    };

    let mut score = 100.0;
    if !mobile.viewport_set {
        score -= 30.0;
    }
    if !mobile.text_size_ok {
        score -= 15.0;
    }
    if !mobile.tap_targets_ok {
        score -= 15.0;
    }
    if !mobile.content_width_ok {
        score -= 20.0;
    }
    score -= capped(mobile.issues.len(), 5.0, 20.0);

    clamp_score(score)
}

pub fn content_quality(findings: &AuditFindings) -> f64 {
    if findings.pages.is_empty() {
        return 0.0;
    }

    let count = |kind| issues_of(&findings.content_issues, kind).count();
    let mut score = 100.0;
    score -= capped(count(ContentIssueKind::DuplicateTitle), 5.0, 15.0);
    score -= capped(count(ContentIssueKind::DuplicateDescription), 3.0, 10.0);
    score -= capped(count(ContentIssueKind::ThinContent), 3.0, 15.0);
    score -= capped(count(ContentIssueKind::MissingTitle), 8.0, 20.0);
    score -= capped(count(ContentIssueKind::MissingH1), 4.0, 10.0);
    score -= capped(count(ContentIssueKind::MissingDescription), 3.0, 10.0);
    score -= capped(count(ContentIssueKind::ImagesMissingAlt), 2.0, 10.0);

    clamp_score(score)
}

pub fn indexability(findings: &AuditFindings) -> f64 {
    if findings.pages.is_empty() {
        return 0.0;
    }

    let html_pages: Vec<_> = findings
        .pages
        .iter()
        .filter(|p| p.is_indexable_html())
        .collect();
    let total = html_pages.len().max(1) as f64;

    let mut score = 100.0;

    let noindex = html_pages.iter().filter(|p| p.is_noindex()).count();
    score -= (noindex as f64 / total * 60.0).min(30.0);

    let no_canonical = html_pages
        .iter()
        .filter(|p| p.canonical_url.as_deref().map_or(true, str::is_empty))
        .count();
    score -= (no_canonical as f64 / total * 40.0).min(20.0);

    if !findings.sitemap.found {
        score -= 15.0;
    }

    clamp_score(score)
}
