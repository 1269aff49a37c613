//! Markdown report generation
//!
//! This module generates a human-readable markdown report of an audit,
//! including scores, issues, passed checks and recommendations.

use crate::output::error::OutputResult;
use crate::report::{AuditResult, CheckOutcome, Severity};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Broken links and redirect chains listed before truncating
const MAX_LISTED: usize = 20;

/// Writes a markdown report of the audit
///
/// # Arguments
///
/// * `result` - The finished audit
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown report
/// * `Err(OutputError)` - Failed to write report
pub fn write_markdown_report(result: &AuditResult, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(result);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    tracing::info!("Markdown report written to {}", output_path.display());
    Ok(())
}

fn outcome_label<T>(outcome: &CheckOutcome<T>) -> String {
    match outcome {
        CheckOutcome::Completed(_) => "completed".to_string(),
        CheckOutcome::Failed { error } => format!("failed ({})", error),
        CheckOutcome::Skipped => "skipped".to_string(),
    }
}

/// Formats an audit result as markdown
pub fn format_markdown_report(result: &AuditResult) -> String {
    let mut md = String::new();

    md.push_str(&format!("# SEO Technical Audit: {}\n\n", result.domain));

    md.push_str("## Overview\n\n");
    md.push_str(&format!("- **URL**: {}\n", result.url));
    md.push_str(&format!("- **Audited**: {}\n", result.timestamp.to_rfc3339()));
    md.push_str(&format!(
        "- **Overall Score**: {:.1} / 100\n",
        result.overall_score
    ));
    md.push_str(&format!("- **Grade**: {}\n", result.grade));
    md.push_str(&format!(
        "- **Issues**: {} errors, {} warnings, {} info\n",
        result.count_severity(Severity::Error),
        result.count_severity(Severity::Warning),
        result.count_severity(Severity::Info)
    ));
    md.push_str(&format!(
        "- **Duration**: {:.1} seconds\n",
        result.elapsed_seconds
    ));
    if result.crawl_summary.deadline_hit {
        md.push_str("- **Note**: the audit deadline was reached; results are partial\n");
    }
    md.push('\n');

    md.push_str("## Category Scores\n\n");
    md.push_str("| Category | Score | Weight |\n");
    md.push_str("|----------|-------|--------|\n");
    for (category, score) in result.category_scores.iter() {
        md.push_str(&format!(
            "| {} | {:.1} | {:.0}% |\n",
            category,
            score,
            category.weight() * 100.0
        ));
    }
    md.push('\n');

    let summary = &result.crawl_summary;
    md.push_str("## Crawl Summary\n\n");
    md.push_str(&format!(
        "- **Pages Crawled**: {} ({} HTML)\n",
        summary.total_pages, summary.html_pages
    ));
    md.push_str(&format!(
        "- **Status Codes**: {} 2xx, {} 3xx, {} 4xx, {} 5xx\n",
        summary.status_2xx, summary.status_3xx, summary.status_4xx, summary.status_5xx
    ));
    md.push_str(&format!(
        "- **Average Word Count**: {}\n",
        summary.avg_word_count
    ));
    md.push_str(&format!(
        "- **Links**: {} internal, {} external\n",
        summary.total_internal_links, summary.total_external_links
    ));
    md.push_str(&format!("- **Images**: {}\n", summary.total_images));
    md.push_str(&format!(
        "- **Deepest Level**: {}\n",
        summary.max_depth_reached
    ));
    md.push_str(&format!(
        "- **Checks**: speed {}, security {}, mobile {}\n\n",
        outcome_label(&result.findings.speed_data),
        outcome_label(&result.findings.security_data),
        outcome_label(&result.findings.mobile_data)
    ));

    if !result.issues.is_empty() {
        md.push_str("## Issues\n\n");
        md.push_str("| Severity | Category | Description | How to Fix |\n");
        md.push_str("|----------|----------|-------------|------------|\n");
        for severity in [Severity::Error, Severity::Warning, Severity::Info] {
            for issue in result.issues.iter().filter(|i| i.severity == severity) {
                md.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    issue.severity,
                    issue.category,
                    escape_cell(&issue.description),
                    escape_cell(&issue.how_to_fix)
                ));
            }
        }
        md.push('\n');
    }

    if !result.passed_checks.is_empty() {
        md.push_str("## Passed Checks\n\n");
        for check in &result.passed_checks {
            md.push_str(&format!("- {}\n", check));
        }
        md.push('\n');
    }

    let broken = &result.findings.broken_links;
    if !broken.is_empty() {
        md.push_str("## Broken Links\n\n");
        md.push_str("| URL | Status | Found On |\n");
        md.push_str("|-----|--------|----------|\n");
        for link in broken.iter().take(MAX_LISTED) {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                link.broken_url, link.status_code, link.source_page
            ));
        }
        if broken.len() > MAX_LISTED {
            md.push_str(&format!("\n... and {} more\n", broken.len() - MAX_LISTED));
        }
        md.push('\n');
    }

    let chains: Vec<_> = result
        .findings
        .redirect_chains
        .iter()
        .filter(|c| c.chain_length > 1 || c.is_loop)
        .collect();
    if !chains.is_empty() {
        md.push_str("## Redirect Chains\n\n");
        for chain in chains.iter().take(MAX_LISTED) {
            let path: Vec<&str> = chain.hops.iter().map(|h| h.url.as_str()).collect();
            md.push_str(&format!(
                "- {} -> {}{}\n",
                path.join(" -> "),
                chain.final_url,
                if chain.is_loop { " (loop)" } else { "" }
            ));
        }
        md.push('\n');
    }

    if !result.recommendations.is_empty() {
        md.push_str("## Recommendations\n\n");
        for rec in &result.recommendations {
            md.push_str(&format!(
                "### [{:?}] {}\n\n{}\n\n",
                rec.priority, rec.title, rec.description
            ));
            for (i, step) in rec.implementation_steps.iter().enumerate() {
                md.push_str(&format!("{}. {}\n", i + 1, step));
            }
            if !rec.affected_urls.is_empty() {
                md.push_str("\nAffected URLs:\n\n");
                for url in &rec.affected_urls {
                    md.push_str(&format!("- {}\n", url));
                }
            }
            md.push('\n');
        }
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
