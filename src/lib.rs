//! seo-audit: a bounded technical SEO auditor
//!
//! This crate crawls a single site politely (robots.txt, sitemaps, bounded
//! breadth-first traversal), runs a fixed battery of technical checks against
//! the crawled pages and the seed URL, and folds everything into a weighted
//! score, an issue list and a set of recommendations.

pub mod auditor;
pub mod checks;
pub mod config;
pub mod context;
pub mod crawler;
pub mod output;
pub mod providers;
pub mod report;
pub mod robots;
pub mod scoring;
pub mod sitemap;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for audit operations
///
/// Only [`AuditError::SeedFetch`], configuration and client construction
/// errors abort an audit. Everything else is recorded on the page, link or
/// check it belongs to and the audit carries on.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Request timeout for {url}")]
    NetworkTimeout { url: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    #[error("TLS handshake with {host} failed: {message}")]
    TlsHandshake { host: String, message: String },

    #[error("Redirect loop detected at {url}")]
    RedirectLoop { url: String },

    #[error("Sitemap nesting too deep at {url} (depth {depth})")]
    SitemapDepthExceeded { url: String, depth: usize },

    #[error("Could not fetch seed URL {url}: {message}")]
    SeedFetch { url: String, message: String },

    #[error("Invalid crawl phase transition: {from} -> {to}")]
    InvalidTransition {
        from: crawler::CrawlPhase,
        to: crawler::CrawlPhase,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuditError {
    /// Classifies a failed request into a timeout or a generic network error
    pub fn from_request(url: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::NetworkTimeout {
                url: url.to_string(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }

    /// Returns true if this error came from a request timing out
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::NetworkTimeout { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Failure of a single optional check or provider
///
/// These never abort an audit; the façade turns them into
/// [`report::CheckOutcome::Failed`].
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Request(#[from] AuditError),

    #[error("{provider} provider failed: {message}")]
    Provider { provider: String, message: String },

    #[error("{stage} did not finish before the audit deadline")]
    Deadline { stage: String },
}

/// Result type alias for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for optional checks
pub type CheckResult<T> = std::result::Result<T, CheckError>;

// Re-export commonly used types
pub use auditor::Auditor;
pub use config::Config;
pub use report::{AuditResult, CheckOutcome, Issue, Severity};
pub use scoring::Grade;
pub use url::{normalize_url, VisitedIndex};
