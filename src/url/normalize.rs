use crate::UrlError;
use url::Url;

/// Normalizes a URL into the key used for crawl deduplication
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything that is not http or https
/// 3. Keep scheme, lowercase host and any non-default port
/// 4. Remove dot segments (done by the parser)
/// 5. Strip trailing slashes; an empty path becomes `/`
/// 6. Drop the query string and the fragment
///
/// Normalizing an already normalized URL returns it unchanged.
///
/// # Arguments
///
/// * `url_str` - The URL string to normalize
///
/// # Returns
///
/// * `Ok(String)` - Normalized URL in `scheme://host[:port]/path` form
/// * `Err(UrlError)` - Failed to parse the URL or unsupported scheme
///
/// # Examples
///
/// ```
/// use seo_audit::url::normalize_url;
///
/// let url = normalize_url("https://Example.com/page/?utm=1#top").unwrap();
/// assert_eq!(url, "https://example.com/page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<String, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(&url)
}

/// Same as [`normalize_url`] for an already parsed URL
pub fn normalize_parsed(url: &Url) -> Result<String, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let host = url.host_str().ok_or(UrlError::MissingDomain)?;
    if host.is_empty() {
        return Err(UrlError::MissingDomain);
    }

    let authority = match url.port() {
        Some(port) => format!("{}:{}", host.to_lowercase(), port),
        None => host.to_lowercase(),
    };

    Ok(format!(
        "{}://{}{}",
        url.scheme(),
        authority,
        normalize_path(url.path())
    ))
}

/// Removes trailing slashes; the root path stays `/`
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}
