//! Integration tests for the seed-URL checks and the speed adapter

use crate::tls_server::TlsServer;
use crate::{redirect_to, test_config};
use seo_audit::checks::{inspect_security_at, trace_redirect, SecurityEndpoints};
use seo_audit::config::{CrawlTarget, DEFAULT_SPEED_ENDPOINT};
use seo_audit::context::{build_http_client, AuditContext};
use seo_audit::providers::{PageSpeedInsightsClient, SpeedInsightsProvider, Strategy};
use seo_audit::report::{compile_issues, AuditFindings, CheckOutcome};
use seo_audit::scoring::rules;
use seo_audit::{CheckError, Severity};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_redirect_loop_terminates() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(path("/x"))
        .respond_with(redirect_to("/y"))
        .mount(&mock_server)
        .await;
    Mock::given(path("/y"))
        .respond_with(redirect_to("/x"))
        .mount(&mock_server)
        .await;

    let client = build_http_client("TestBot/1.0", Duration::from_secs(5), false).unwrap();
    let chain = trace_redirect(&client, &format!("{}/x", base_url))
        .await
        .expect("a redirecting URL yields a chain");

    assert!(chain.is_loop);
    assert_eq!(chain.chain_length, 2);
    assert_eq!(chain.redirect_type, 301);
    assert_eq!(chain.hops[1].redirects_to.as_deref(), Some(format!("{}/x", base_url).as_str()));
}

#[tokio::test]
async fn test_security_without_tls() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let port = url::Url::parse(&base_url).unwrap().port().unwrap();

    Mock::given(path("/insecure"))
        .respond_with(redirect_to("https://127.0.0.1/"))
        .mount(&mock_server)
        .await;
    Mock::given(path("/secure"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(
                    r#"<html><body><img src="http://cdn.example.com/a.png"></body></html>"#,
                )
                .insert_header("content-type", "text/html")
                .insert_header("strict-transport-security", "max-age=31536000")
                .insert_header("x-content-type-options", "nosniff"),
        )
        .mount(&mock_server)
        .await;

    let config = test_config();
    let target = CrawlTarget::new(&base_url, &config.crawler).unwrap();
    let ctx = AuditContext::new(target, &config).unwrap();

    // The mock server speaks plain HTTP, so the handshake must fail
    let endpoints = SecurityEndpoints {
        tls_host: "127.0.0.1".to_string(),
        tls_port: port,
        http_url: format!("{}/insecure", base_url),
        https_url: format!("{}/secure", base_url),
    };
    let report = inspect_security_at(&ctx, &endpoints).await.unwrap();

    assert!(!report.ssl_valid);
    assert!(report.https_enforced);
    assert!(report.has_header("HSTS"));
    assert!(report.has_header("X-Content-Type-Options"));
    assert!(!report.has_header("X-Frame-Options"));
    assert_eq!(report.mixed_content.len(), 1);
    assert_eq!(report.mixed_content[0].url, "http://cdn.example.com/a.png");

    let findings = AuditFindings {
        security_data: CheckOutcome::Completed(report),
        ..AuditFindings::default()
    };
    let issues = compile_issues(&findings, &base_url);
    assert!(issues.iter().any(|i| {
        i.severity == Severity::Error && i.description == "SSL certificate is invalid or missing"
    }));

    // -40 SSL, -5 mixed content, -10 X-Frame-Options
    assert_eq!(rules::security(&findings), 45.0);
}

#[tokio::test]
async fn test_security_with_self_signed_certificate() {
    let tls_server = TlsServer::start(
        &[
            ("strict-transport-security", "max-age=31536000"),
            ("x-frame-options", "DENY"),
            ("content-security-policy", "default-src 'self'"),
            ("x-content-type-options", "nosniff"),
            ("referrer-policy", "no-referrer"),
            ("permissions-policy", "camera=()"),
        ],
        r#"<html><body><img src="http://cdn.example.com/a.png"></body></html>"#,
    )
    .await;

    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    Mock::given(path("/insecure"))
        .respond_with(redirect_to(&tls_server.url()))
        .mount(&mock_server)
        .await;

    let config = test_config();
    let target = CrawlTarget::new(&base_url, &config.crawler).unwrap();
    let ctx = AuditContext::new(target, &config).unwrap();

    let endpoints = SecurityEndpoints {
        tls_host: "127.0.0.1".to_string(),
        tls_port: tls_server.port(),
        http_url: format!("{}/insecure", base_url),
        https_url: tls_server.url(),
    };
    let report = inspect_security_at(&ctx, &endpoints).await.unwrap();

    assert!(!report.ssl_valid);
    assert!(report.https_enforced);
    for label in [
        "HSTS",
        "X-Frame-Options",
        "CSP",
        "X-Content-Type-Options",
        "Referrer-Policy",
        "Permissions-Policy",
    ] {
        assert!(report.has_header(label), "{} should be present", label);
    }
    assert_eq!(report.mixed_content.len(), 1);
    assert!(!report.issues.iter().any(|i| i.contains("headers check failed")));

    let findings = AuditFindings {
        security_data: CheckOutcome::Completed(report),
        ..AuditFindings::default()
    };
    let issues = compile_issues(&findings, &base_url);
    assert!(issues.iter().any(|i| {
        i.severity == Severity::Error && i.description == "SSL certificate is invalid or missing"
    }));

    // -40 SSL, -5 mixed content
    assert_eq!(rules::security(&findings), 55.0);
}

fn lighthouse_body(score: f64, lcp: f64) -> serde_json::Value {
    json!({
        "lighthouseResult": {
            "categories": { "performance": { "score": score } },
            "audits": {
                "largest-contentful-paint": { "numericValue": lcp },
                "cumulative-layout-shift": { "numericValue": 0.051234 },
                "server-response-time": { "numericValue": 312.456 },
                "unused-javascript": {
                    "title": "Reduce unused JavaScript",
                    "description": "Remove dead code",
                    "score": 0.3,
                    "details": { "type": "opportunity", "overallSavingsMs": 900 }
                }
            }
        }
    })
}

#[tokio::test]
async fn test_pagespeed_client_against_mock() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/runPagespeed"))
        .and(query_param("strategy", "mobile"))
        .and(query_param("category", "performance"))
        .and(query_param("key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lighthouse_body(0.63, 3120.5)))
        .mount(&mock_server)
        .await;

    let endpoint = format!("{}/runPagespeed", mock_server.uri());
    let client = PageSpeedInsightsClient::new(&endpoint, Some("secret".to_string())).unwrap();
    let analysis = client
        .analyze("https://example.com/", Strategy::Mobile)
        .await
        .expect("analysis should succeed");

    assert_eq!(analysis.metrics.performance_score, 63.0);
    assert_eq!(analysis.metrics.lcp, Some(3120.5));
    assert_eq!(analysis.metrics.cls, Some(0.05));
    assert_eq!(analysis.metrics.ttfb, Some(312.46));
    assert_eq!(analysis.metrics.inp, None);
    assert_eq!(analysis.opportunities.len(), 1);
    assert_eq!(analysis.opportunities[0].title, "Reduce unused JavaScript");
}

#[tokio::test]
async fn test_pagespeed_client_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(path("/runPagespeed"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let endpoint = format!("{}/runPagespeed", mock_server.uri());
    let client = PageSpeedInsightsClient::new(&endpoint, None).unwrap();
    let err = client
        .analyze("https://example.com/", Strategy::Desktop)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckError::Provider { .. }));
    assert!(err.to_string().contains("429"));
}

#[tokio::test]
async fn test_pagespeed_client_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(path("/runPagespeed"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html>rate limited</html>")
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let endpoint = format!("{}/runPagespeed", mock_server.uri());
    let client = PageSpeedInsightsClient::new(&endpoint, None).unwrap();
    let err = client
        .analyze("https://example.com/", Strategy::Mobile)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckError::Provider { .. }));
    assert!(err.to_string().contains("invalid JSON"));
}

#[test]
fn test_default_speed_endpoint() {
    assert!(DEFAULT_SPEED_ENDPOINT.starts_with("https://www.googleapis.com/"));
}
