//! Integration tests for audit history and exports on disk

use crate::{html, test_config};
use seo_audit::output::{export_json, write_markdown_report};
use seo_audit::report::{compare_audits, AuditSnapshot, Direction};
use seo_audit::storage::{open_store, record_audit, AuditStore};
use seo_audit::{AuditResult, Auditor};
use tempfile::TempDir;
use wiremock::matchers::path;
use wiremock::{Mock, MockServer};

async fn audit_simple_site() -> AuditResult {
    let mock_server = MockServer::start().await;
    Mock::given(path("/"))
        .respond_with(html(r#"<h1>Home</h1><a href="/about">About</a>"#))
        .mount(&mock_server)
        .await;
    Mock::given(path("/about"))
        .respond_with(html("<h1>About</h1>"))
        .mount(&mock_server)
        .await;

    Auditor::new(test_config())
        .unwrap()
        .run(&mock_server.uri())
        .await
        .expect("audit should succeed")
}

#[tokio::test]
async fn test_audit_history_persists_across_opens() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("audits.db");
    let result = audit_simple_site().await;
    let first = AuditSnapshot::from(&result);

    {
        let mut store = open_store(&db_path).unwrap();
        assert!(record_audit(&mut store, &first).unwrap().is_none());
    }

    let mut improved = first.clone();
    improved.timestamp = first.timestamp + chrono::Duration::days(7);
    improved.overall_score = (first.overall_score + 5.0).min(100.0);
    improved.issue_count = 0;

    let mut store = open_store(&db_path).unwrap();
    let previous = record_audit(&mut store, &improved)
        .unwrap()
        .expect("first audit is returned as previous");
    assert_eq!(previous.domain, first.domain);
    assert_eq!(previous.overall_score, first.overall_score);
    assert_eq!(store.count_audits().unwrap(), 2);

    let history = store.audit_history(&first.domain, 10).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].timestamp, improved.timestamp);

    let comparison = compare_audits(&previous, &improved);
    assert_ne!(comparison.overall_change.direction, Direction::Regressed);
    assert_eq!(comparison.issues_change.new_count, 0);
}

#[tokio::test]
async fn test_export_json_and_markdown() {
    let temp_dir = TempDir::new().unwrap();
    let json_path = temp_dir.path().join("audit.json");
    let md_path = temp_dir.path().join("audit.md");
    let result = audit_simple_site().await;

    export_json(&result, &json_path).unwrap();
    write_markdown_report(&result, &md_path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json["domain"], "127.0.0.1");
    assert_eq!(json["grade"], result.grade.as_str());
    assert_eq!(json["pages"].as_array().unwrap().len(), 2);
    assert_eq!(json["speed_data"]["status"], "skipped");
    assert!(json["robots_data"].is_object());

    let markdown = std::fs::read_to_string(&md_path).unwrap();
    assert!(markdown.contains("# SEO Technical Audit: 127.0.0.1"));
    assert!(markdown.contains("## Category Scores"));
}
