//! Robots.txt handling module
//!
//! This module fetches and parses the site's robots.txt. Fetch failures are
//! never fatal: an unreachable or non-200 robots.txt yields a permissive
//! policy with `exists = false`.

mod parser;

pub use parser::RobotsPolicy;

use reqwest::{Client, StatusCode};

/// Fetches robots.txt from the site origin
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `origin` - Site origin, e.g. `https://example.com`
/// * `agent` - Product token our rules are evaluated for
///
/// # Returns
///
/// The parsed policy, or [`RobotsPolicy::missing`] on any failure
pub async fn fetch_robots(client: &Client, origin: &str, agent: &str) -> RobotsPolicy {
    let robots_url = format!("{}/robots.txt", origin.trim_end_matches('/'));

    let response = match client.get(&robots_url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}", robots_url, e);
            return RobotsPolicy::missing();
        }
    };

    if response.status() != StatusCode::OK {
        tracing::info!(
            "robots.txt not available at {} (HTTP {})",
            robots_url,
            response.status().as_u16()
        );
        return RobotsPolicy::missing();
    }

    match response.text().await {
        Ok(body) => {
            let policy = RobotsPolicy::parse(&body, agent);
            tracing::info!(
                "Loaded robots.txt: {} disallow, {} allow, {} sitemap(s)",
                policy.disallowed_paths.len(),
                policy.allowed_paths.len(),
                policy.sitemap_urls.len()
            );
            policy
        }
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", robots_url, e);
            RobotsPolicy::missing()
        }
    }
}
