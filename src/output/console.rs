//! Terminal output of audit results

use crate::report::{AuditComparison, AuditResult, Direction, Severity};

/// Issues shown per severity before truncating
const ISSUES_PER_SEVERITY: usize = 10;

/// Prints the audit summary to stdout
///
/// # Arguments
///
/// * `result` - The finished audit
pub fn print_audit_summary(result: &AuditResult) {
    println!("=== SEO Technical Audit: {} ===\n", result.domain);

    println!(
        "Overall Score: {:.1}/100 (Grade {})",
        result.overall_score, result.grade
    );
    println!();

    println!("Category Scores:");
    for (category, score) in result.category_scores.iter() {
        println!("  {:<16} {:>5.1}", category.as_str(), score);
    }
    println!();

    let summary = &result.crawl_summary;
    println!("Crawl:");
    println!(
        "  Pages crawled: {} ({} HTML)",
        summary.total_pages, summary.html_pages
    );
    println!(
        "  Status codes: {} 2xx, {} 3xx, {} 4xx, {} 5xx",
        summary.status_2xx, summary.status_3xx, summary.status_4xx, summary.status_5xx
    );
    println!(
        "  Duration: {:.1}s ({:.1} pages/s)",
        result.elapsed_seconds, summary.pages_per_second
    );
    if summary.deadline_hit {
        println!("  Deadline reached, results are partial");
    }
    println!();

    for severity in [Severity::Error, Severity::Warning, Severity::Info] {
        let issues: Vec<_> = result
            .issues
            .iter()
            .filter(|i| i.severity == severity)
            .collect();
        if issues.is_empty() {
            continue;
        }

        println!("{} ({}):", severity.as_str().to_uppercase(), issues.len());
        for issue in issues.iter().take(ISSUES_PER_SEVERITY) {
            println!("  - [{}] {}", issue.category, issue.description);
        }
        if issues.len() > ISSUES_PER_SEVERITY {
            println!("  ... and {} more", issues.len() - ISSUES_PER_SEVERITY);
        }
        println!();
    }

    if !result.passed_checks.is_empty() {
        println!("Passed ({}):", result.passed_checks.len());
        for check in &result.passed_checks {
            println!("  + {}", check);
        }
        println!();
    }

    if !result.recommendations.is_empty() {
        println!("Recommendations:");
        for rec in &result.recommendations {
            println!("  [{:?}] {}", rec.priority, rec.title);
        }
    }
}

fn arrow(direction: Direction) -> &'static str {
    match direction {
        Direction::Improved => "+",
        Direction::Regressed => "-",
        Direction::Unchanged => "=",
    }
}

/// Prints the difference against the previous audit
pub fn print_comparison(comparison: &AuditComparison) {
    println!(
        "\n=== Since {} ===",
        comparison.old_timestamp.format("%Y-%m-%d %H:%M UTC")
    );

    let overall = &comparison.overall_change;
    println!(
        "Overall: {:.1} -> {:.1} ({}{:.1})",
        overall.old,
        overall.new,
        arrow(overall.direction),
        overall.diff.abs()
    );
    if comparison.grade_change.old != comparison.grade_change.new {
        println!(
            "Grade: {} -> {}",
            comparison.grade_change.old, comparison.grade_change.new
        );
    }

    for (category, change) in &comparison.category_changes {
        if change.direction == Direction::Unchanged {
            continue;
        }
        println!(
            "  {:<16} {:>5.1} -> {:>5.1} ({}{:.1})",
            category.as_str(),
            change.old,
            change.new,
            arrow(change.direction),
            change.diff.abs()
        );
    }

    let issues = &comparison.issues_change;
    println!(
        "Issues: {} -> {} ({:+})",
        issues.old_count, issues.new_count, issues.diff
    );
}
