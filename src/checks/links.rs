//! Broken link detection
//!
//! Every distinct link URL seen during the crawl is checked once with a
//! status-only request. Redirects are followed; only a final status of 400
//! or more, or a failed request, marks a link as broken.

use crate::context::AuditContext;
use crate::crawler::PageRecord;
use crate::AuditError;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A link that did not resolve to a working page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokenLinkRecord {
    /// Page the link was first seen on
    pub source_page: String,
    pub broken_url: String,
    /// Final HTTP status, or 0 when the request failed
    pub status_code: u16,
    pub link_text: String,
    pub error: Option<String>,
}

/// A unique link to check, with the first place it was seen
struct LinkToCheck<'a> {
    url: &'a str,
    source_page: &'a str,
    text: &'a str,
}

/// Checks every unique internal and external link of the crawled pages
///
/// # Returns
///
/// Broken links in the order they were first discovered
pub async fn audit_links(ctx: &AuditContext, pages: &[PageRecord]) -> Vec<BrokenLinkRecord> {
    let links = unique_links(pages);
    if links.is_empty() {
        return Vec::new();
    }
    tracing::info!("Checking {} unique link(s)", links.len());

    let client = ctx.client();
    let tasks = links.iter().map(|link| async move {
        let outcome = check_link(client, link.url).await;
        classify(link, outcome)
    });

    let (results, _) = ctx.run_bounded(tasks).await;
    let broken: Vec<BrokenLinkRecord> = results.into_iter().flatten().collect();
    tracing::info!("Found {} broken link(s)", broken.len());
    broken
}

/// Deduplicates link URLs across all pages, keeping the first source
fn unique_links(pages: &[PageRecord]) -> Vec<LinkToCheck<'_>> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut links = Vec::new();

    for page in pages {
        for link in page.internal_links.iter().chain(page.external_links.iter()) {
            if seen.insert(link.url.as_str()) {
                links.push(LinkToCheck {
                    url: &link.url,
                    source_page: &page.url,
                    text: &link.text,
                });
            }
        }
    }

    links
}

/// Issues a HEAD request, retried as GET when HEAD is not supported
///
/// # Returns
///
/// * `Ok(u16)` - Final status after redirects
/// * `Err(AuditError)` - The request itself failed
pub async fn check_link(client: &Client, url: &str) -> Result<u16, AuditError> {
    let head = client
        .head(url)
        .send()
        .await
        .map_err(|e| AuditError::from_request(url, &e))?;

    let status = head.status();
    if status != StatusCode::METHOD_NOT_ALLOWED && status != StatusCode::NOT_IMPLEMENTED {
        return Ok(status.as_u16());
    }

    tracing::debug!("HEAD not supported by {}, retrying with GET", url);
    // The body is never read; dropping the response closes it
    let get = client
        .get(url)
        .send()
        .await
        .map_err(|e| AuditError::from_request(url, &e))?;
    Ok(get.status().as_u16())
}

fn classify(link: &LinkToCheck, outcome: Result<u16, AuditError>) -> Option<BrokenLinkRecord> {
    let (status_code, error) = match outcome {
        Ok(status) if status < 400 => return None,
        Ok(status) => (status, None),
        Err(e) => (0, Some(e.to_string())),
    };

    tracing::debug!("Broken link {} (status {}) on {}", link.url, status_code, link.source_page);
    Some(BrokenLinkRecord {
        source_page: link.source_page.to_string(),
        broken_url: link.url.to_string(),
        status_code,
        link_text: link.text.to_string(),
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::Link;

    fn page(url: &str, internal: &[&str], external: &[&str]) -> PageRecord {
        let to_links = |urls: &[&str]| {
            urls.iter()
                .map(|u| Link {
                    url: u.to_string(),
                    text: format!("text for {}", u),
                })
                .collect()
        };
        PageRecord {
            url: url.to_string(),
            internal_links: to_links(internal),
            external_links: to_links(external),
            ..PageRecord::default()
        }
    }

    #[test]
    fn test_unique_links_keep_first_source() {
        let pages = vec![
            page("https://a.com/", &["https://a.com/x", "https://a.com/y"], &["https://b.com/"]),
            page("https://a.com/x", &["https://a.com/y"], &["https://b.com/"]),
        ];
        let links = unique_links(&pages);
        let urls: Vec<_> = links.iter().map(|l| l.url).collect();
        assert_eq!(urls, vec!["https://a.com/x", "https://a.com/y", "https://b.com/"]);
        assert!(links.iter().all(|l| l.source_page == "https://a.com/"));
    }

    #[test]
    fn test_classify() {
        let link = LinkToCheck {
            url: "https://a.com/gone",
            source_page: "https://a.com/",
            text: "Gone",
        };
        assert!(classify(&link, Ok(200)).is_none());
        assert!(classify(&link, Ok(301)).is_none());

        let broken = classify(&link, Ok(404)).unwrap();
        assert_eq!(broken.status_code, 404);
        assert_eq!(broken.link_text, "Gone");
        assert!(broken.error.is_none());

        let failed = classify(
            &link,
            Err(AuditError::NetworkTimeout {
                url: "https://a.com/gone".into(),
            }),
        )
        .unwrap();
        assert_eq!(failed.status_code, 0);
        assert!(failed.error.unwrap().contains("timeout"));
    }
}
