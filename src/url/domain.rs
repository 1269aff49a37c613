use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use seo_audit::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Builds the key two URLs must share to count as the same site
///
/// The key is the lowercase host, with a leading `www.` removed, plus the
/// port when it is not the scheme default. `https://www.example.com` and
/// `https://example.com` therefore share a key; `blog.example.com` does not.
pub fn site_key(url: &Url) -> Option<String> {
    let host = extract_domain(url)?;
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Returns true if `url` belongs to the site identified by `site`
///
/// # Arguments
///
/// * `url` - Absolute URL to test
/// * `site` - Key produced by [`site_key`] for the seed URL
pub fn is_same_site(url: &Url, site: &str) -> bool {
    site_key(url).map(|key| key == site).unwrap_or(false)
}

/// Returns `scheme://host[:port]` for a URL
pub fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}
