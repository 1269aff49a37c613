//! Sitemap XML parsing
//!
//! Element names are matched by local name only, so documents with or
//! without the sitemaps.org namespace parse the same way.

use crate::AuditError;
use serde::{Deserialize, Serialize};

/// One `<url>` entry of a urlset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: Option<String>,
    pub changefreq: Option<String>,
    pub priority: Option<String>,
}

/// A parsed sitemap document
#[derive(Debug, Clone, PartialEq)]
pub enum SitemapDocument {
    /// `<sitemapindex>`: child sitemap URLs to follow
    Index(Vec<String>),
    /// `<urlset>`: page entries
    UrlSet(Vec<SitemapEntry>),
}

/// Parses a sitemap or sitemap index
///
/// For an index, child locations come from `<sitemap><loc>` plus any other
/// `<loc>` that ends in `.xml`, deduplicated in document order.
///
/// # Returns
///
/// * `Ok(SitemapDocument)` - The parsed document
/// * `Err(AuditError::Parse)` - Not well-formed XML or an unknown root element
pub fn parse_sitemap(xml: &str) -> Result<SitemapDocument, AuditError> {
    let document = roxmltree::Document::parse(xml).map_err(|e| AuditError::Parse {
        what: "sitemap XML".to_string(),
        message: e.to_string(),
    })?;

    let root = document.root_element();
    match root.tag_name().name() {
        "sitemapindex" => {
            let mut children: Vec<String> = Vec::new();

            let declared = root
                .children()
                .filter(|n| n.has_tag_name("sitemap"))
                .filter_map(|n| child_text(n, "loc"));

            let xml_locs = root
                .descendants()
                .filter(|n| n.tag_name().name() == "loc")
                .filter_map(|n| n.text())
                .map(|t| t.trim().to_string())
                .filter(|t| t.ends_with(".xml"));

            for loc in declared.chain(xml_locs) {
                if !loc.is_empty() && !children.contains(&loc) {
                    children.push(loc);
                }
            }
            Ok(SitemapDocument::Index(children))
        }
        "urlset" => {
            let entries = root
                .children()
                .filter(|n| n.tag_name().name() == "url")
                .filter_map(|n| {
                    let loc = child_text(n, "loc")?;
                    Some(SitemapEntry {
                        loc,
                        lastmod: child_text(n, "lastmod"),
                        changefreq: child_text(n, "changefreq"),
                        priority: child_text(n, "priority"),
                    })
                })
                .collect();
            Ok(SitemapDocument::UrlSet(entries))
        }
        other => Err(AuditError::Parse {
            what: "sitemap XML".to_string(),
            message: format!("unexpected root element <{}>", other),
        }),
    }
}

/// Trimmed, non-empty text of the first child element with the given local name
fn child_text(node: roxmltree::Node, name: &str) -> Option<String> {
    node.children()
        .find(|c| c.tag_name().name() == name)
        .and_then(|c| c.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_urlset_with_namespace() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>https://example.com/</loc>
    <lastmod>2024-01-01</lastmod>
    <changefreq>daily</changefreq>
    <priority>1.0</priority>
  </url>
  <url><loc> https://example.com/about </loc></url>
  <url><lastmod>2024-01-01</lastmod></url>
</urlset>"#;

        let SitemapDocument::UrlSet(entries) = parse_sitemap(xml).unwrap() else {
            panic!("expected urlset");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].loc, "https://example.com/");
        assert_eq!(entries[0].lastmod.as_deref(), Some("2024-01-01"));
        assert_eq!(entries[0].changefreq.as_deref(), Some("daily"));
        assert_eq!(entries[0].priority.as_deref(), Some("1.0"));
        assert_eq!(entries[1].loc, "https://example.com/about");
        assert_eq!(entries[1].lastmod, None);
    }

    #[test]
    fn test_parse_urlset_without_namespace() {
        let xml = "<urlset><url><loc>https://example.com/a</loc></url></urlset>";
        let SitemapDocument::UrlSet(entries) = parse_sitemap(xml).unwrap() else {
            panic!("expected urlset");
        };
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_parse_index_dedupes_children() {
        let xml = r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>https://example.com/posts.xml</loc></sitemap>
  <sitemap><loc>https://example.com/pages.xml</loc></sitemap>
  <sitemap><loc>https://example.com/posts.xml</loc></sitemap>
</sitemapindex>"#;

        assert_eq!(
            parse_sitemap(xml).unwrap(),
            SitemapDocument::Index(vec![
                "https://example.com/posts.xml".to_string(),
                "https://example.com/pages.xml".to_string(),
            ])
        );
    }

    #[test]
    fn test_parse_index_picks_up_stray_xml_locs() {
        let xml = "<sitemapindex><group><loc>https://example.com/extra.xml</loc></group></sitemapindex>";
        assert_eq!(
            parse_sitemap(xml).unwrap(),
            SitemapDocument::Index(vec!["https://example.com/extra.xml".to_string()])
        );
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(
            parse_sitemap("<urlset><url>"),
            Err(AuditError::Parse { .. })
        ));
    }

    #[test]
    fn test_unexpected_root() {
        assert!(parse_sitemap("<html><body/></html>").is_err());
    }
}
