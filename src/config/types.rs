use serde::Deserialize;

/// Default PageSpeed Insights v5 endpoint
pub const DEFAULT_SPEED_ENDPOINT: &str = "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

/// Main configuration structure
///
/// Every table and key is optional; a missing file behaves like an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub checks: ChecksConfig,
    pub speed: SpeedConfig,
    pub output: OutputConfig,
}

/// Crawler bounds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of pages fetched per audit
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Maximum link depth from the seed URL
    #[serde(rename = "max-depth")]
    pub max_depth: usize,

    /// Maximum number of concurrent requests
    pub concurrency: usize,

    /// Timeout for each individual request (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Overall audit deadline (seconds); unbounded when absent
    #[serde(rename = "audit-deadline-secs")]
    pub audit_deadline_secs: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 100,
            max_depth: 5,
            concurrency: 5,
            request_timeout_secs: 20,
            audit_deadline_secs: None,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler, also the robots.txt agent token
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SEOAuditBot".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/seo-audit/seo-audit".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Full User-Agent header: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }

    /// Product token matched against robots.txt groups
    pub fn robots_token(&self) -> &str {
        &self.crawler_name
    }
}

/// Which optional checks run against the seed URL
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChecksConfig {
    pub speed: bool,
    pub security: bool,
    pub mobile: bool,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            speed: true,
            security: true,
            mobile: true,
        }
    }
}

/// PageSpeed Insights provider settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeedConfig {
    /// API key; requests are sent unauthenticated when absent
    #[serde(rename = "api-key")]
    pub api_key: Option<String>,

    /// Endpoint of the runPagespeed API
    pub endpoint: String,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_SPEED_ENDPOINT.to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database of past audits
    #[serde(rename = "database-path")]
    pub database_path: Option<String>,

    /// Where to write the full JSON report
    #[serde(rename = "json-path")]
    pub json_path: Option<String>,

    /// Where to write the markdown summary
    #[serde(rename = "markdown-path")]
    pub markdown_path: Option<String>,
}
