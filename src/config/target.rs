use crate::config::types::CrawlerConfig;
use crate::url::{extract_domain, origin_of, seed_url_for, site_key};
use crate::{UrlError, UrlResult};
use url::Url;

/// What a single audit crawls, fixed for the audit's lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlTarget {
    start_url: Url,
    domain: String,
    site: String,
    max_pages: usize,
    max_depth: usize,
    concurrency: usize,
}

impl CrawlTarget {
    /// Builds a target from a domain or URL and the crawler bounds
    ///
    /// # Arguments
    ///
    /// * `input` - `example.com`, `https://example.com/start`, ...
    /// * `bounds` - Validated crawler configuration
    pub fn new(input: &str, bounds: &CrawlerConfig) -> UrlResult<Self> {
        let start_url = seed_url_for(input)?;
        let domain = extract_domain(&start_url).ok_or(UrlError::MissingDomain)?;
        let site = site_key(&start_url).ok_or(UrlError::MissingDomain)?;

        Ok(Self {
            start_url,
            domain,
            site,
            max_pages: bounds.max_pages,
            max_depth: bounds.max_depth,
            concurrency: bounds.concurrency.max(1),
        })
    }

    pub fn start_url(&self) -> &Url {
        &self.start_url
    }

    /// Lowercase host of the seed URL
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Same-site key links are compared against
    pub fn site(&self) -> &str {
        &self.site
    }

    /// `scheme://host[:port]` of the seed URL
    pub fn origin(&self) -> String {
        origin_of(&self.start_url)
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }
}
