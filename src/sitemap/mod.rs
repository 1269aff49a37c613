//! XML sitemap discovery
//!
//! Probes the conventional sitemap locations plus any sitemap advertised in
//! robots.txt, follows sitemap indexes up to [`MAX_SITEMAP_DEPTH`] levels and
//! collects the page entries. Failures are recorded in the report and never
//! abort the audit.

mod parser;

pub use parser::{parse_sitemap, SitemapDocument, SitemapEntry};

use crate::AuditError;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// Maximum nesting of sitemap indexes that will be followed
pub const MAX_SITEMAP_DEPTH: usize = 3;

/// Conventional sitemap paths probed on every site
const DEFAULT_SITEMAP_PATHS: &[&str] = &["/sitemap.xml", "/sitemap_index.xml"];

/// Outcome of sitemap discovery
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SitemapReport {
    /// True when at least one page entry was found
    pub found: bool,

    /// Number of page entries across all sitemaps
    pub total_urls: usize,

    /// Sitemap documents that were fetched and parsed
    pub sitemaps: Vec<String>,

    /// Page entries in discovery order
    pub entries: Vec<SitemapEntry>,

    /// Fetch and parse errors, one line each
    pub errors: Vec<String>,
}

/// Discovers and reads the sitemaps of one site
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `origin` - Site origin, e.g. `https://example.com`
/// * `advertised` - Sitemap URLs listed in robots.txt
pub async fn discover_sitemaps(client: &Client, origin: &str, advertised: &[String]) -> SitemapReport {
    let origin = origin.trim_end_matches('/');
    let mut candidates: Vec<String> = DEFAULT_SITEMAP_PATHS
        .iter()
        .map(|path| format!("{}{}", origin, path))
        .collect();
    for url in advertised {
        if !candidates.contains(url) {
            candidates.push(url.clone());
        }
    }

    let mut report = SitemapReport::default();

    // Depth-first so entries keep document order. Revisits are allowed; the
    // depth cap is what ends a cyclic index.
    let mut stack: Vec<(String, usize)> = candidates.into_iter().rev().map(|u| (u, 0)).collect();

    while let Some((url, depth)) = stack.pop() {
        if depth > MAX_SITEMAP_DEPTH {
            let err = AuditError::SitemapDepthExceeded { url, depth };
            tracing::warn!("{}", err);
            report.errors.push(err.to_string());
            continue;
        }

        let body = match fetch_sitemap(client, &url).await {
            Ok(Some(body)) => body,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!("{}", e);
                report.errors.push(e.to_string());
                continue;
            }
        };

        match parse_sitemap(&body) {
            Ok(SitemapDocument::Index(children)) => {
                tracing::debug!("Sitemap index {} lists {} sitemap(s)", url, children.len());
                report.sitemaps.push(url);
                for child in children.into_iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
            Ok(SitemapDocument::UrlSet(entries)) => {
                tracing::debug!("Sitemap {} lists {} URL(s)", url, entries.len());
                report.sitemaps.push(url);
                report.entries.extend(entries);
            }
            Err(e) => {
                tracing::warn!("Invalid sitemap at {}: {}", url, e);
                report.errors.push(format!("{}: {}", url, e));
            }
        }
    }

    report.total_urls = report.entries.len();
    report.found = report.total_urls > 0;
    tracing::info!(
        "Sitemap discovery: {} URL(s) from {} sitemap(s)",
        report.total_urls,
        report.sitemaps.len()
    );
    report
}

/// Fetches one sitemap document
///
/// A non-200 response is silently skipped (`Ok(None)`); only transport
/// failures are errors.
async fn fetch_sitemap(client: &Client, url: &str) -> Result<Option<String>, AuditError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AuditError::from_request(url, &e))?;

    if response.status() != StatusCode::OK {
        tracing::debug!("No sitemap at {} (HTTP {})", url, response.status().as_u16());
        return Ok(None);
    }

    response
        .text()
        .await
        .map(Some)
        .map_err(|e| AuditError::from_request(url, &e))
}
