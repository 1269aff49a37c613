//! Redirect chain tracing
//!
//! Internal link URLs are re-requested with automatic redirects disabled and
//! followed one hop at a time, so chains and loops become visible.

use crate::context::AuditContext;
use crate::crawler::PageRecord;
use crate::AuditError;
use reqwest::header::LOCATION;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// Maximum number of hops followed per chain
pub const MAX_REDIRECT_HOPS: usize = 10;

/// Status codes treated as redirects
const REDIRECT_STATUSES: &[u16] = &[301, 302, 303, 307, 308];

/// One request in a redirect chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedirectHop {
    pub url: String,
    /// 0 when the request failed
    pub status: u16,
    pub redirects_to: Option<String>,
    pub error: Option<String>,
}

/// The redirects observed for one starting URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedirectChain {
    pub original_url: String,
    pub hops: Vec<RedirectHop>,
    pub chain_length: usize,
    pub is_loop: bool,
    pub final_url: String,
    /// Status of the first hop
    pub redirect_type: u16,
}

/// Traces every unique internal link URL of the crawled pages
///
/// # Returns
///
/// Chains with at least one hop, in link discovery order
pub async fn trace_redirects(ctx: &AuditContext, pages: &[PageRecord]) -> Vec<RedirectChain> {
    let mut checked: HashSet<&str> = HashSet::new();
    let urls: Vec<&str> = pages
        .iter()
        .flat_map(|page| page.internal_links.iter())
        .map(|link| link.url.as_str())
        .filter(|url| checked.insert(*url))
        .collect();

    if urls.is_empty() {
        return Vec::new();
    }
    tracing::info!("Tracing redirects for {} internal URL(s)", urls.len());

    let client = ctx.no_redirect_client();
    let tasks = urls.iter().map(|url| trace_redirect(client, url));
    let (results, _) = ctx.run_bounded(tasks).await;

    let chains: Vec<RedirectChain> = results.into_iter().flatten().collect();
    tracing::info!(
        "Found {} redirecting URL(s), {} loop(s)",
        chains.len(),
        chains.iter().filter(|c| c.is_loop).count()
    );
    chains
}

/// Follows redirects from one URL by hand
///
/// Stops on a non-redirect status, a failed request, a repeated URL (loop)
/// or after [`MAX_REDIRECT_HOPS`] hops.
///
/// # Arguments
///
/// * `client` - A client with automatic redirects disabled
/// * `url` - Starting URL
///
/// # Returns
///
/// * `Some(RedirectChain)` - At least one hop was recorded
/// * `None` - The URL answered without redirecting
pub async fn trace_redirect(client: &Client, url: &str) -> Option<RedirectChain> {
    let mut hops: Vec<RedirectHop> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut current = url.to_string();
    let mut is_loop = false;

    for _ in 0..MAX_REDIRECT_HOPS {
        if !seen.insert(current.clone()) {
            is_loop = true;
            tracing::warn!("{}", AuditError::RedirectLoop { url: current.clone() });
            break;
        }

        let response = match client.get(&current).send().await {
            Ok(response) => response,
            Err(e) => {
                hops.push(RedirectHop {
                    url: current.clone(),
                    status: 0,
                    redirects_to: None,
                    error: Some(AuditError::from_request(&current, &e).to_string()),
                });
                break;
            }
        };

        let status = response.status().as_u16();
        if !REDIRECT_STATUSES.contains(&status) {
            break;
        }

        let target = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|location| resolve_location(&current, location));

        hops.push(RedirectHop {
            url: current.clone(),
            status,
            redirects_to: target.clone(),
            error: None,
        });

        match target {
            Some(next) => current = next,
            None => break,
        }
    }

    let redirect_type = hops.first()?.status;
    Some(RedirectChain {
        original_url: url.to_string(),
        redirect_type,
        chain_length: hops.len(),
        hops,
        is_loop,
        final_url: current,
    })
}

/// Resolves a Location header against the URL that sent it
fn resolve_location(base: &str, location: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    base.join(location.trim()).ok().map(|u| u.to_string())
}
