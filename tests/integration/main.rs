//! Integration tests for seo-audit
//!
//! Every test stands up its own wiremock server as the audited site.

mod audit_tests;
mod checks_tests;
mod crawl_tests;
mod storage_tests;
mod tls_server;

use seo_audit::config::{ChecksConfig, Config, CrawlerConfig};
use wiremock::ResponseTemplate;

/// Configuration with every seed-URL check turned off
pub fn test_config() -> Config {
    Config {
        crawler: CrawlerConfig {
            max_pages: 20,
            max_depth: 3,
            concurrency: 4,
            request_timeout_secs: 5,
            audit_deadline_secs: None,
        },
        checks: ChecksConfig {
            speed: false,
            security: false,
            mobile: false,
        },
        ..Config::default()
    }
}

/// HTML response with the given body content
pub fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(
            format!(
                "<html><head><title>Test page</title></head><body>{}</body></html>",
                body
            ),
            "text/html; charset=utf-8",
        )
}

/// Permanent redirect to a path on the same server
pub fn redirect_to(location: &str) -> ResponseTemplate {
    ResponseTemplate::new(301).insert_header("location", location)
}
