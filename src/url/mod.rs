//! URL handling module
//!
//! This module provides URL normalization, same-site detection and the
//! bounded visited index used by the crawler.

mod domain;
mod normalize;
mod visited;

pub use domain::{extract_domain, is_same_site, origin_of, site_key};
pub use normalize::{normalize_parsed, normalize_url};
pub use visited::{Claim, VisitedIndex};

use crate::UrlError;
use url::Url;

/// Turns user input (`example.com`, `www.example.com/`, `http://host:8080`)
/// into an absolute seed URL
///
/// Bare domains get `https://`; explicit http/https URLs are kept as given.
pub fn seed_url_for(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::MissingDomain);
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }
    if url.host_str().map(str::is_empty).unwrap_or(true) {
        return Err(UrlError::MissingDomain);
    }
    Ok(url)
}
