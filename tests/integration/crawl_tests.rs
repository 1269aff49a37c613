//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use crate::{html, test_config};
use seo_audit::config::CrawlTarget;
use seo_audit::context::AuditContext;
use seo_audit::crawler::run_crawl;
use seo_audit::sitemap::{discover_sitemaps, MAX_SITEMAP_DEPTH};
use seo_audit::AuditError;
use wiremock::matchers::path;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context_for(server_uri: &str, max_pages: usize) -> AuditContext {
    let mut config = test_config();
    config.crawler.max_pages = max_pages;
    let target = CrawlTarget::new(server_uri, &config.crawler).expect("valid target");
    AuditContext::new(target, &config).expect("context")
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;

    Mock::given(path("/"))
        .respond_with(html(
            r#"<a href="/page1">Page 1</a> <a href="/page2">Page 2</a>
               <a href="https://elsewhere.example/">Elsewhere</a>"#,
        ))
        .mount(&mock_server)
        .await;
    Mock::given(path("/page1"))
        .respond_with(html(r#"<p>Content 1</p><a href="/page2">Page 2 again</a>"#))
        .mount(&mock_server)
        .await;
    Mock::given(path("/page2"))
        .respond_with(html("<p>Content 2</p>"))
        .mount(&mock_server)
        .await;

    let ctx = context_for(&mock_server.uri(), 20);
    let crawl = run_crawl(&ctx).await.expect("crawl should succeed");

    assert_eq!(crawl.pages.len(), 3, "seed plus two internal pages");
    assert_eq!(crawl.pages[0].depth, 0);
    assert!(crawl.pages[1..].iter().all(|p| p.depth == 1));
    assert_eq!(crawl.max_depth_reached, 1);
    assert_eq!(crawl.pages[0].external_links.len(), 1);
    assert!(!crawl.deadline_hit);

    // No robots.txt and no sitemap are served
    assert!(!crawl.robots.exists);
    assert!(!crawl.sitemap.found);
}

#[tokio::test]
async fn test_crawl_respects_max_pages() {
    let mock_server = MockServer::start().await;

    let links: String = (1..=9)
        .map(|i| format!(r#"<a href="/p{}">P{}</a>"#, i, i))
        .collect();
    Mock::given(path("/"))
        .respond_with(html(&links))
        .mount(&mock_server)
        .await;
    for i in 1..=9 {
        Mock::given(path(format!("/p{}", i)))
            .respond_with(html("<p>leaf</p>"))
            .mount(&mock_server)
            .await;
    }

    let ctx = context_for(&mock_server.uri(), 3);
    let crawl = run_crawl(&ctx).await.expect("crawl should succeed");

    assert_eq!(crawl.pages.len(), 3);
}

#[tokio::test]
async fn test_crawl_respects_robots_disallow() {
    let mock_server = MockServer::start().await;

    Mock::given(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"),
        )
        .mount(&mock_server)
        .await;
    Mock::given(path("/"))
        .respond_with(html(
            r#"<a href="/private/secret">Secret</a> <a href="/public">Public</a>"#,
        ))
        .mount(&mock_server)
        .await;
    Mock::given(path("/public"))
        .respond_with(html("<p>public</p>"))
        .mount(&mock_server)
        .await;
    Mock::given(path("/private/secret"))
        .respond_with(html("<p>secret</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let ctx = context_for(&mock_server.uri(), 20);
    let crawl = run_crawl(&ctx).await.expect("crawl should succeed");

    assert!(crawl.robots.exists);
    assert_eq!(crawl.robots.disallowed_paths, vec!["/private".to_string()]);
    assert_eq!(crawl.pages.len(), 2);
    assert!(crawl.pages.iter().all(|p| !p.url.contains("/private")));
}

#[tokio::test]
async fn test_crawl_reads_sitemap() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc>{0}/</loc><priority>1.0</priority></url>
              <url><loc>{0}/about</loc></url>
            </urlset>"#,
            base_url
        )))
        .mount(&mock_server)
        .await;
    Mock::given(path("/"))
        .respond_with(html("<p>home</p>"))
        .mount(&mock_server)
        .await;

    let ctx = context_for(&base_url, 20);
    let crawl = run_crawl(&ctx).await.expect("crawl should succeed");

    assert!(crawl.sitemap.found);
    assert_eq!(crawl.sitemap.total_urls, 2);
    assert_eq!(crawl.sitemap.sitemaps, vec![format!("{}/sitemap.xml", base_url)]);
}

fn sitemap_index(children: &[String]) -> ResponseTemplate {
    let locs: String = children
        .iter()
        .map(|c| format!("<sitemap><loc>{}</loc></sitemap>", c))
        .collect();
    ResponseTemplate::new(200).set_body_string(format!(
        r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</sitemapindex>"#,
        locs
    ))
}

#[tokio::test]
async fn test_child_sitemap_shared_by_two_indexes_counts_twice() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let pages = format!("{}/pages.xml", base_url);

    Mock::given(path("/sitemap.xml"))
        .respond_with(sitemap_index(&[pages.clone()]))
        .mount(&mock_server)
        .await;
    Mock::given(path("/sitemap_index.xml"))
        .respond_with(sitemap_index(&[pages.clone()]))
        .mount(&mock_server)
        .await;
    Mock::given(path("/pages.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc>{0}/a</loc></url>
              <url><loc>{0}/b</loc></url>
            </urlset>"#,
            base_url
        )))
        .mount(&mock_server)
        .await;

    let client = reqwest::Client::new();
    let report = discover_sitemaps(&client, &base_url, &[]).await;

    assert!(report.found);
    assert_eq!(report.total_urls, 4);
    assert_eq!(report.sitemaps.iter().filter(|s| **s == pages).count(), 2);
    assert!(report.errors.is_empty());
}

#[tokio::test]
async fn test_self_referencing_index_stops_at_depth_cap() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let index = format!("{}/sitemap.xml", base_url);

    Mock::given(path("/sitemap.xml"))
        .respond_with(sitemap_index(&[index.clone()]))
        .mount(&mock_server)
        .await;

    let client = reqwest::Client::new();
    let report = discover_sitemaps(&client, &base_url, &[]).await;

    assert!(!report.found);
    assert_eq!(report.total_urls, 0);
    assert_eq!(report.sitemaps.len(), MAX_SITEMAP_DEPTH + 1);
    assert_eq!(report.errors.len(), 1);
}

#[tokio::test]
async fn test_unreachable_seed_is_fatal() {
    // Bind and release a port so nothing is listening on it
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("local addr").port()
    };
    let uri = format!("http://127.0.0.1:{}", port);

    let ctx = context_for(&uri, 20);
    let result = run_crawl(&ctx).await;

    assert!(matches!(result, Err(AuditError::SeedFetch { .. })));
}

#[tokio::test]
async fn test_seed_error_status_is_not_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let ctx = context_for(&mock_server.uri(), 20);
    let crawl = run_crawl(&ctx).await.expect("a 500 seed still yields a crawl");

    assert_eq!(crawl.pages.len(), 1);
    assert_eq!(crawl.pages[0].status_code, 500);
}
