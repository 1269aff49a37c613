//! Issue compiler and passed-check list

use crate::checks::{ContentIssue, ContentIssueKind, SECURITY_HEADERS};
use crate::report::model::{AuditFindings, Issue, Severity};
use crate::scoring::Category;

/// Duplicate issues list at most this many of their URLs
const MAX_DUPLICATE_URLS: usize = 3;

fn issue(
    severity: Severity,
    category: Category,
    description: impl Into<String>,
    how_to_fix: impl Into<String>,
    affected_url: impl Into<String>,
) -> Issue {
    Issue {
        severity,
        category,
        description: description.into(),
        how_to_fix: how_to_fix.into(),
        affected_url: affected_url.into(),
    }
}

/// Flattens every finding into uniform issues
///
/// # Arguments
///
/// * `findings` - Raw findings of all stages
/// * `site_url` - Seed URL, used for site-wide issues
pub fn compile_issues(findings: &AuditFindings, site_url: &str) -> Vec<Issue> {
    let mut issues = Vec::new();

    for link in &findings.broken_links {
        issues.push(issue(
            Severity::Error,
            Category::Crawlability,
            format!("Broken link (status {}) on {}", link.status_code, link.source_page),
            format!("Remove or update the link pointing to {}", link.broken_url),
            link.broken_url.as_str(),
        ));
    }

    for chain in findings.redirect_chains.iter().filter(|c| c.chain_length > 1) {
        let severity = if chain.is_loop {
            Severity::Error
        } else {
            Severity::Warning
        };
        issues.push(issue(
            severity,
            Category::Crawlability,
            format!("Redirect chain ({} hops) from {}", chain.chain_length, chain.original_url),
            format!("Update links to point directly to {}", chain.final_url),
            chain.original_url.as_str(),
        ));
    }

    issues.extend(findings.content_issues.iter().map(content_issue));

    if let Some(security) = findings.security_data.as_completed() {
        if !security.ssl_valid {
            issues.push(issue(
                Severity::Error,
                Category::Security,
                "SSL certificate is invalid or missing",
                "Install a valid SSL certificate (free via Let's Encrypt)",
                site_url,
            ));
        }
        if !security.https_enforced {
            issues.push(issue(
                Severity::Warning,
                Category::Security,
                "HTTP does not redirect to HTTPS",
                "Configure server to 301 redirect HTTP to HTTPS",
                site_url,
            ));
        }
        for mixed in &security.mixed_content {
            issues.push(issue(
                Severity::Warning,
                Category::Security,
                format!("Mixed content: {} loads over HTTP", mixed.tag),
                format!("Update resource URL to HTTPS: {}", mixed.url),
                mixed.url.as_str(),
            ));
        }
        for (label, _) in SECURITY_HEADERS {
            if !security.has_header(label) {
                issues.push(issue(
                    Severity::Info,
                    Category::Security,
                    format!("Missing security header: {}", label),
                    format!("Add the {} header to server responses", label),
                    site_url,
                ));
            }
        }
    }

    if let Some(mobile) = findings.mobile_data.as_completed() {
        for text in &mobile.issues {
            issues.push(issue(
                Severity::Warning,
                Category::Mobile,
                text.as_str(),
                "Review mobile responsiveness and fix the reported issue",
                site_url,
            ));
        }
    }

    if let Some(speed) = findings.speed_data.as_completed() {
        let score = speed.mobile.performance_score;
        if score < 50.0 {
            issues.push(issue(
                Severity::Error,
                Category::Performance,
                format!("Poor mobile performance score: {}", score),
                "Optimise images, reduce JavaScript, enable caching",
                site_url,
            ));
        }
        if let Some(lcp) = speed.mobile.lcp.filter(|lcp| *lcp > 2500.0) {
            let severity = if lcp < 4000.0 {
                Severity::Warning
            } else {
                Severity::Error
            };
            issues.push(issue(
                severity,
                Category::Performance,
                format!("LCP is {}ms (target <2500ms)", lcp.round()),
                "Optimise largest contentful paint element",
                site_url,
            ));
        }
    }

    tracing::debug!("Compiled {} issue(s)", issues.len());
    issues
}

fn content_issue(content: &ContentIssue) -> Issue {
    let url = content.url();
    let count = content.count.unwrap_or(0);
    match content.kind {
        ContentIssueKind::DuplicateTitle => issue(
            Severity::Warning,
            Category::ContentQuality,
            format!("Duplicate title across {} pages", content.urls.len()),
            "Write unique title tags for each page",
            first_urls(content),
        ),
        ContentIssueKind::DuplicateDescription => issue(
            Severity::Warning,
            Category::ContentQuality,
            format!("Duplicate meta description across {} pages", content.urls.len()),
            "Write unique meta descriptions for each page",
            first_urls(content),
        ),
        ContentIssueKind::ThinContent => issue(
            content.severity,
            Category::ContentQuality,
            format!("Thin content ({} words) at {}", count, url),
            "Expand content to at least 300 words or consolidate with related pages",
            url,
        ),
        ContentIssueKind::MissingTitle => issue(
            Severity::Error,
            Category::ContentQuality,
            format!("Missing title tag at {}", url),
            "Add a unique, descriptive title tag",
            url,
        ),
        ContentIssueKind::MissingDescription => issue(
            Severity::Warning,
            Category::ContentQuality,
            format!("Missing meta description at {}", url),
            "Add a compelling meta description (150-160 characters)",
            url,
        ),
        ContentIssueKind::MissingH1 => issue(
            Severity::Warning,
            Category::ContentQuality,
            format!("Missing H1 tag at {}", url),
            "Add a single, descriptive H1 heading",
            url,
        ),
        ContentIssueKind::MultipleH1 => issue(
            Severity::Info,
            Category::ContentQuality,
            format!("{} H1 tags at {}", count, url),
            "Keep a single H1 heading per page",
            url,
        ),
        ContentIssueKind::ImagesMissingAlt => issue(
            Severity::Warning,
            Category::ContentQuality,
            format!("{} images missing alt text at {}", count, url),
            "Add descriptive alt attributes to all images",
            url,
        ),
    }
}

fn first_urls(content: &ContentIssue) -> String {
    content
        .urls
        .iter()
        .take(MAX_DUPLICATE_URLS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Lists the positive signals of an audit
pub fn compile_passed_checks(findings: &AuditFindings) -> Vec<String> {
    let mut passed = Vec::new();

    if findings.robots.exists {
        passed.push("robots.txt is present and accessible".to_string());
    }
    if findings.sitemap.found {
        passed.push(format!(
            "XML sitemap found with {} URLs",
            findings.sitemap.total_urls
        ));
    }
    if findings.broken_links.is_empty() {
        passed.push("No broken links detected".to_string());
    }

    if let Some(security) = findings.security_data.as_completed() {
        if security.ssl_valid {
            passed.push("Valid SSL certificate".to_string());
        }
        if security.https_enforced {
            passed.push("HTTP to HTTPS redirect is in place".to_string());
        }
        if security.mixed_content.is_empty() {
            passed.push("No mixed content detected".to_string());
        }
    }

    if let Some(mobile) = findings.mobile_data.as_completed() {
        if mobile.is_mobile_friendly {
            passed.push("Page is mobile-friendly".to_string());
        }
        if mobile.viewport_set {
            passed.push("Viewport meta tag is set".to_string());
        }
    }

    if let Some(speed) = findings.speed_data.as_completed() {
        if speed.mobile.performance_score >= 90.0 {
            passed.push("Excellent mobile performance score".to_string());
        }
    }

    passed
}
