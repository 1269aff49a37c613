//! Mobile-friendliness heuristics for the seed page
//!
//! These are static checks on the served HTML only: viewport meta tag,
//! inline font sizes, tiny tap targets and very wide fixed widths.

use crate::context::AuditContext;
use crate::{AuditError, CheckResult};
use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Inline font sizes below this many pixels count as small text
pub const MIN_FONT_SIZE_PX: u32 = 12;

/// More small-text declarations than this fails the text size check
pub const SMALL_TEXT_LIMIT: usize = 5;

/// More tiny tap targets than this fails the tap target check
pub const TINY_TAP_TARGET_LIMIT: usize = 3;

static FONT_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)font-size\s*:\s*(\d+)").expect("Failed to compile font-size regex")
});

static WIDE_FIXED_WIDTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)width\s*:\s*\d{4,}px").expect("Failed to compile width regex")
});

/// Result of the mobile heuristics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MobileReport {
    pub url: String,
    pub is_mobile_friendly: bool,
    pub viewport_set: bool,
    pub text_size_ok: bool,
    pub tap_targets_ok: bool,
    pub content_width_ok: bool,
    pub small_text_count: usize,
    pub tiny_tap_targets: usize,
    pub wide_elements: usize,
    pub issues: Vec<String>,
}

/// Fetches the seed page and runs the heuristics on it
///
/// # Returns
///
/// * `Ok(MobileReport)` - The page was fetched and analyzed
/// * `Err(CheckError)` - Request failure or a non-200 answer
pub async fn check_mobile(ctx: &AuditContext) -> CheckResult<MobileReport> {
    let url = ctx.target().start_url().as_str();
    let response = ctx
        .client()
        .get(url)
        .send()
        .await
        .map_err(|e| AuditError::from_request(url, &e))?;

    let status = response.status().as_u16();
    if status != 200 {
        return Err(AuditError::HttpStatus {
            url: url.to_string(),
            status,
        }
        .into());
    }

    let html = response
        .text()
        .await
        .map_err(|e| AuditError::from_request(url, &e))?;

    let report = analyze_mobile_html(url, &html);
    tracing::info!(
        "Mobile: friendly={}, {} issue(s)",
        report.is_mobile_friendly,
        report.issues.len()
    );
    Ok(report)
}

/// Runs the mobile heuristics on already fetched HTML
pub fn analyze_mobile_html(url: &str, html: &str) -> MobileReport {
    let document = Html::parse_document(html);
    let mut report = MobileReport {
        url: url.to_string(),
        text_size_ok: true,
        tap_targets_ok: true,
        content_width_ok: true,
        ..MobileReport::default()
    };

    match viewport_content(&document) {
        None => {
            report.content_width_ok = false;
            report.issues.push("Missing viewport meta tag".to_string());
        }
        Some(content) => {
            report.viewport_set = true;
            let normalized: String = content.split_whitespace().collect::<String>().to_lowercase();
            if !normalized.contains("width=device-width") {
                report.content_width_ok = false;
                report
                    .issues
                    .push("Viewport does not set width=device-width".to_string());
            }
        }
    }

    let styles: Vec<&str> = select(&document, "[style]")
        .filter_map(|e| e.value().attr("style"))
        .collect();

    report.small_text_count = styles
        .iter()
        .flat_map(|style| FONT_SIZE.captures_iter(style))
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .filter(|size| *size < MIN_FONT_SIZE_PX)
        .count();
    if report.small_text_count > SMALL_TEXT_LIMIT {
        report.text_size_ok = false;
        report.issues.push(format!(
            "{} elements with font-size < {}px",
            report.small_text_count, MIN_FONT_SIZE_PX
        ));
    }

    report.tiny_tap_targets = select(&document, "a, button")
        .filter(|e| {
            let text: String = e.text().collect();
            let has_image = Selector::parse("img")
                .map(|img| e.select(&img).next().is_some())
                .unwrap_or(false);
            text.trim().chars().count() <= 1 && !has_image
        })
        .count();
    if report.tiny_tap_targets > TINY_TAP_TARGET_LIMIT {
        report.tap_targets_ok = false;
        report.issues.push(format!(
            "{} potentially too-small tap targets",
            report.tiny_tap_targets
        ));
    }

    report.wide_elements = styles
        .iter()
        .filter(|style| WIDE_FIXED_WIDTH.is_match(style))
        .count();
    if report.wide_elements > 0 {
        report.content_width_ok = false;
        report.issues.push(format!(
            "{} elements with very wide fixed widths",
            report.wide_elements
        ));
    }

    report.is_mobile_friendly = report.issues.is_empty();
    report
}

fn select<'a>(document: &'a Html, css: &str) -> impl Iterator<Item = scraper::ElementRef<'a>> + 'a {
    let selector = Selector::parse(css).ok();
    selector
        .into_iter()
        .flat_map(move |s| document.select(&s).collect::<Vec<_>>())
}

fn viewport_content(document: &Html) -> Option<String> {
    select(document, "meta[name]")
        .find(|m| {
            m.value()
                .attr("name")
                .map(|n| n.trim().eq_ignore_ascii_case("viewport"))
                .unwrap_or(false)
        })
        .map(|m| m.value().attr("content").unwrap_or("").to_string())
}
