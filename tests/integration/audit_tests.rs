//! End-to-end audits through the façade

use crate::{html, redirect_to, test_config};
use async_trait::async_trait;
use seo_audit::checks::ContentIssueKind;
use seo_audit::providers::{
    Opportunity, SpeedInsightsProvider, Strategy, StrategyAnalysis, StrategyMetrics,
};
use seo_audit::report::CheckOutcome;
use seo_audit::{AuditError, Auditor, CheckError, CheckResult, Grade, Severity};
use std::sync::Arc;
use wiremock::matchers::path;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Speed provider answering with fixed metrics
struct FixedSpeed {
    score: f64,
    lcp: f64,
}

#[async_trait]
impl SpeedInsightsProvider for FixedSpeed {
    async fn analyze(&self, _url: &str, _strategy: Strategy) -> CheckResult<StrategyAnalysis> {
        Ok(StrategyAnalysis {
            metrics: StrategyMetrics {
                performance_score: self.score,
                lcp: Some(self.lcp),
                cls: Some(0.01),
                ..StrategyMetrics::default()
            },
            opportunities: vec![Opportunity {
                id: "render-blocking-resources".into(),
                title: "Eliminate render-blocking resources".into(),
                description: String::new(),
                savings_ms: 420.0,
                score: Some(0.4),
            }],
        })
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

struct BrokenSpeed;

#[async_trait]
impl SpeedInsightsProvider for BrokenSpeed {
    async fn analyze(&self, _url: &str, _strategy: Strategy) -> CheckResult<StrategyAnalysis> {
        Err(CheckError::Provider {
            provider: "broken".into(),
            message: "quota exceeded".into(),
        })
    }

    fn name(&self) -> &str {
        "broken"
    }
}

#[tokio::test]
async fn test_broken_links_detected() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(path("/"))
        .respond_with(html(
            r#"<h1>Home</h1><a href="/ok">OK</a> <a href="/moved">Moved</a> <a href="/gone">Gone</a>"#,
        ))
        .mount(&mock_server)
        .await;
    Mock::given(path("/ok"))
        .respond_with(html("<h1>OK</h1>"))
        .mount(&mock_server)
        .await;
    Mock::given(path("/moved"))
        .respond_with(redirect_to(&format!("{}/ok", base_url)))
        .mount(&mock_server)
        .await;
    Mock::given(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let auditor = Auditor::new(test_config()).unwrap();
    let result = auditor.run(&base_url).await.expect("audit should succeed");

    let broken = &result.findings.broken_links;
    assert_eq!(broken.len(), 1);
    assert!(broken[0].broken_url.ends_with("/gone"));
    assert_eq!(broken[0].status_code, 404);
    assert_eq!(broken[0].link_text, "Gone");
    assert_eq!(broken[0].source_page, format!("{}/", base_url));

    assert!(result
        .issues
        .iter()
        .any(|i| i.severity == Severity::Error && i.description.starts_with("Broken link (status 404)")));

    // A single 301 is recorded but not reported
    assert_eq!(result.findings.redirect_chains.len(), 1);
    assert_eq!(result.findings.redirect_chains[0].chain_length, 1);
    assert!(!result.issues.iter().any(|i| i.description.starts_with("Redirect chain")));
}

#[tokio::test]
async fn test_two_hop_redirect_chain_warning() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(path("/"))
        .respond_with(html(r#"<a href="/a">A</a>"#))
        .mount(&mock_server)
        .await;
    Mock::given(path("/a"))
        .respond_with(redirect_to("/b"))
        .mount(&mock_server)
        .await;
    Mock::given(path("/b"))
        .respond_with(redirect_to("/c"))
        .mount(&mock_server)
        .await;
    Mock::given(path("/c"))
        .respond_with(html("<p>final</p>"))
        .mount(&mock_server)
        .await;

    let auditor = Auditor::new(test_config()).unwrap();
    let result = auditor.run(&base_url).await.expect("audit should succeed");

    let chains = &result.findings.redirect_chains;
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].chain_length, 2);
    assert!(!chains[0].is_loop);
    assert_eq!(chains[0].final_url, format!("{}/c", base_url));

    let chain_issues: Vec<_> = result
        .issues
        .iter()
        .filter(|i| i.description.starts_with("Redirect chain"))
        .collect();
    assert_eq!(chain_issues.len(), 1);
    assert_eq!(chain_issues[0].severity, Severity::Warning);
}

#[tokio::test]
async fn test_missing_robots_and_sitemap_penalty() {
    let mock_server = MockServer::start().await;

    Mock::given(path("/"))
        .respond_with(html("<h1>Only page</h1>"))
        .mount(&mock_server)
        .await;

    let auditor = Auditor::new(test_config()).unwrap();
    let result = auditor
        .run(&mock_server.uri())
        .await
        .expect("audit should succeed");

    assert!(!result.findings.robots.exists);
    assert!(!result.findings.sitemap.found);
    assert_eq!(result.category_scores.crawlability, 85.0);
    assert!(result.passed_checks.contains(&"No broken links detected".to_string()));
}

#[tokio::test]
async fn test_clean_site_full_crawlability() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /\n"))
        .mount(&mock_server)
        .await;
    Mock::given(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><url><loc>{}/</loc></url></urlset>"#,
            base_url
        )))
        .mount(&mock_server)
        .await;
    Mock::given(path("/"))
        .respond_with(html("<h1>Only page</h1>"))
        .mount(&mock_server)
        .await;

    let auditor = Auditor::new(test_config()).unwrap();
    let result = auditor.run(&base_url).await.expect("audit should succeed");

    assert_eq!(result.category_scores.crawlability, 100.0);
    assert!(result
        .passed_checks
        .contains(&"robots.txt is present and accessible".to_string()));
    assert!(result
        .passed_checks
        .contains(&"XML sitemap found with 1 URLs".to_string()));
}

#[tokio::test]
async fn test_duplicate_titles_grouped() {
    let mock_server = MockServer::start().await;

    Mock::given(path("/"))
        .respond_with(html(r#"<a href="/one">1</a> <a href="/two">2</a>"#))
        .mount(&mock_server)
        .await;
    Mock::given(path("/one"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    "<html><head><title>Best SEO Tools</title></head><body></body></html>",
                    "text/html",
                ),
        )
        .mount(&mock_server)
        .await;
    Mock::given(path("/two"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    "<html><head><title>best seo tools</title></head><body></body></html>",
                    "text/html",
                ),
        )
        .mount(&mock_server)
        .await;

    let auditor = Auditor::new(test_config()).unwrap();
    let result = auditor
        .run(&mock_server.uri())
        .await
        .expect("audit should succeed");

    let duplicates: Vec<_> = result
        .findings
        .content_issues
        .iter()
        .filter(|i| i.kind == ContentIssueKind::DuplicateTitle)
        .collect();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].urls.len(), 2);
}

#[tokio::test]
async fn test_optional_checks_skipped_and_neutral() {
    let mock_server = MockServer::start().await;

    Mock::given(path("/"))
        .respond_with(html("<h1>Home</h1>"))
        .mount(&mock_server)
        .await;

    let auditor = Auditor::new(test_config()).unwrap();
    let result = auditor
        .run(&mock_server.uri())
        .await
        .expect("audit should succeed");

    assert_eq!(result.findings.speed_data, CheckOutcome::Skipped);
    assert_eq!(result.findings.security_data, CheckOutcome::Skipped);
    assert_eq!(result.findings.mobile_data, CheckOutcome::Skipped);
    assert_eq!(result.category_scores.performance, 50.0);
    assert_eq!(result.category_scores.security, 50.0);
    assert_eq!(result.category_scores.mobile, 50.0);

    assert!((0.0..=100.0).contains(&result.overall_score));
    assert_eq!(result.grade, Grade::from_score(result.overall_score));
    assert!(!result.recommendations.is_empty());
}

#[tokio::test]
async fn test_mobile_check_runs_against_seed() {
    let mock_server = MockServer::start().await;

    Mock::given(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(
                    r#"<html><head><title>Home</title>
                    <meta name="viewport" content="width=device-width, initial-scale=1">
                    </head><body><h1>Home</h1></body></html>"#,
                )
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let mut config = test_config();
    config.checks.mobile = true;
    let auditor = Auditor::new(config).unwrap();
    let result = auditor
        .run(&mock_server.uri())
        .await
        .expect("audit should succeed");

    let mobile = result
        .findings
        .mobile_data
        .as_completed()
        .expect("mobile check should complete");
    assert!(mobile.viewport_set);
    assert!(mobile.is_mobile_friendly);
    assert_eq!(result.category_scores.mobile, 100.0);
    assert!(result.passed_checks.contains(&"Page is mobile-friendly".to_string()));
}

#[tokio::test]
async fn test_speed_provider_feeds_performance() {
    let mock_server = MockServer::start().await;

    Mock::given(path("/"))
        .respond_with(html("<h1>Home</h1>"))
        .mount(&mock_server)
        .await;

    let mut config = test_config();
    config.checks.speed = true;
    let auditor = Auditor::new(config)
        .unwrap()
        .with_speed_provider(Arc::new(FixedSpeed {
            score: 40.0,
            lcp: 4200.0,
        }));
    let result = auditor
        .run(&mock_server.uri())
        .await
        .expect("audit should succeed");

    let speed = result.findings.speed_data.as_completed().expect("speed completed");
    assert_eq!(speed.mobile.performance_score, 40.0);
    assert_eq!(speed.opportunities.len(), 1);

    // 40 * 0.6 + 40 * 0.4 - 10 for a mobile LCP over 4000 ms
    assert_eq!(result.category_scores.performance, 30.0);
    assert!(result
        .issues
        .iter()
        .any(|i| i.description == "Poor mobile performance score: 40"));
}

#[tokio::test]
async fn test_failing_speed_provider_does_not_abort() {
    let mock_server = MockServer::start().await;

    Mock::given(path("/"))
        .respond_with(html("<h1>Home</h1>"))
        .mount(&mock_server)
        .await;

    let mut config = test_config();
    config.checks.speed = true;
    let auditor = Auditor::new(config)
        .unwrap()
        .with_speed_provider(Arc::new(BrokenSpeed));
    let result = auditor
        .run(&mock_server.uri())
        .await
        .expect("audit should succeed");

    assert_eq!(
        result.findings.speed_data.error(),
        Some("broken provider failed: quota exceeded")
    );
    assert_eq!(result.category_scores.performance, 50.0);
}

#[tokio::test]
async fn test_unreachable_seed_aborts_audit() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("local addr").port()
    };

    let auditor = Auditor::new(test_config()).unwrap();
    let result = auditor.run(&format!("http://127.0.0.1:{}", port)).await;

    assert!(matches!(result, Err(AuditError::SeedFetch { .. })));
}
