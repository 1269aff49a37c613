//! HTTP fetcher implementation
//!
//! Fetches one page with redirects followed and turns the response into a
//! [`PageRecord`]. Request failures never escape: they become a record with
//! `status_code = 0` and an error note.

use crate::crawler::page::PageRecord;
use crate::crawler::parser::parse_html;
use crate::AuditError;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Instant;

/// Fetches and parses a single page
///
/// # Arguments
///
/// * `client` - Redirect-following HTTP client
/// * `url` - The URL to fetch
/// * `depth` - Link depth from the seed URL
/// * `site` - Same-site key used to split internal and external links
///
/// # Returns
///
/// A PageRecord; non-HTML responses are recorded without parsing
pub async fn fetch_page(client: &Client, url: &str, depth: usize, site: &str) -> PageRecord {
    let started = Instant::now();

    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            let err = AuditError::from_request(url, &e);
            tracing::debug!("{}", err);
            let note = if err.is_timeout() {
                "timeout".to_string()
            } else {
                e.to_string()
            };
            return PageRecord::failed(url, depth, note, started.elapsed().as_secs_f64());
        }
    };

    let status_code = response.status().as_u16();
    let final_url = response.url().clone();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let mut page = PageRecord {
        url: url.to_string(),
        final_url: final_url.to_string(),
        status_code,
        content_type: content_type.clone(),
        depth,
        ..PageRecord::default()
    };

    if !content_type.to_ascii_lowercase().contains("text/html") {
        page.load_time = started.elapsed().as_secs_f64();
        tracing::debug!("Not HTML ({}): {}", content_type, url);
        return page;
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            page.load_time = started.elapsed().as_secs_f64();
            page.error = Some(AuditError::from_request(url, &e).to_string());
            return page;
        }
    };
    page.load_time = started.elapsed().as_secs_f64();

    let parsed = parse_html(&body, &final_url, site);
    page.is_html = true;
    page.title = parsed.title;
    page.meta_description = parsed.meta_description;
    page.h1 = parsed.h1;
    page.h2 = parsed.h2;
    page.word_count = parsed.word_count;
    page.internal_links = parsed.internal_links;
    page.external_links = parsed.external_links;
    page.images = parsed.images;
    page.canonical_url = parsed.canonical_url;
    page.robots_meta = parsed.robots_meta;
    page.hreflang = parsed.hreflang;
    page.structured_data_types = parsed.structured_data_types;

    tracing::debug!(
        "Fetched {} (HTTP {}, {} words, {} internal links)",
        url,
        status_code,
        page.word_count,
        page.internal_links.len()
    );
    page
}
