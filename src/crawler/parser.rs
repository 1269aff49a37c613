//! HTML parser for extracting links and SEO signals
//!
//! This module handles parsing HTML content to extract:
//! - Title, meta description, robots meta and canonical link
//! - H1/H2 headings and the visible word count
//! - Links, partitioned into internal and external
//! - Images with their alt text
//! - hreflang alternates and structured-data `@type` values

use crate::crawler::page::{Hreflang, Image, Link};
use crate::url::is_same_site;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use url::Url;

/// Maximum number of characters of anchor text kept per link
pub const MAX_LINK_TEXT_CHARS: usize = 120;

/// Elements whose text never counts as visible words
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPage {
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub word_count: usize,
    pub internal_links: Vec<Link>,
    pub external_links: Vec<Link>,
    pub images: Vec<Image>,
    pub canonical_url: Option<String>,
    pub robots_meta: Option<String>,
    pub hreflang: Vec<Hreflang>,
    pub structured_data_types: Vec<String>,
}

/// Parses HTML content and extracts SEO signals
///
/// # Link Extraction Rules
///
/// **Exclude:**
/// - Fragment-only links (`#section`)
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
/// - Anything that is not http(s) after resolution
///
/// Relative links are resolved against `base_url` (the final URL after
/// redirects). Fragments are removed from resolved links.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The URL the document was served from
/// * `site` - Same-site key of the audited site
///
/// # Example
///
/// ```
/// use seo_audit::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url, "example.com");
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.internal_links.len(), 1);
/// ```
pub fn parse_html(html: &str, base_url: &Url, site: &str) -> ParsedPage {
    let document = Html::parse_document(html);
    let (internal_links, external_links) = extract_links(&document, base_url, site);

    ParsedPage {
        title: extract_title(&document),
        meta_description: meta_content(&document, "description"),
        h1: heading_texts(&document, "h1"),
        h2: heading_texts(&document, "h2"),
        word_count: visible_word_count(&document),
        internal_links,
        external_links,
        images: extract_images(&document, base_url),
        canonical_url: extract_canonical(&document),
        robots_meta: meta_content(&document, "robots"),
        hreflang: extract_hreflang(&document),
        structured_data_types: extract_structured_data_types(&document),
    }
}

/// Selects all elements matching a static CSS selector
fn select<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Collapses runs of whitespace in an element's text
fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    select(document, "title")
        .first()
        .map(element_text)
        .filter(|s| !s.is_empty())
}

/// Content of the first `<meta name=...>` whose name matches case-insensitively
fn meta_content(document: &Html, name: &str) -> Option<String> {
    select(document, "meta[name]")
        .into_iter()
        .find(|m| {
            m.value()
                .attr("name")
                .map(|n| n.trim().eq_ignore_ascii_case(name))
                .unwrap_or(false)
        })
        .and_then(|m| m.value().attr("content"))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

fn heading_texts(document: &Html, tag: &str) -> Vec<String> {
    select(document, tag)
        .iter()
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Counts whitespace-separated words outside script/style blocks
fn visible_word_count(document: &Html) -> usize {
    document
        .tree
        .nodes()
        .filter_map(|node| node.value().as_text().map(|text| (node, text)))
        .filter(|(node, _)| {
            !node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .map(|e| INVISIBLE_ELEMENTS.contains(&e.name()))
                    .unwrap_or(false)
            })
        })
        .map(|(_, text)| text.split_whitespace().count())
        .sum()
}

/// True if `rel` contains the given token
fn has_rel(element: &ElementRef, token: &str) -> bool {
    element
        .value()
        .attr("rel")
        .map(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case(token)))
        .unwrap_or(false)
}

fn extract_canonical(document: &Html) -> Option<String> {
    select(document, "link[rel][href]")
        .into_iter()
        .find(|l| has_rel(l, "canonical"))
        .and_then(|l| l.value().attr("href"))
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
}

fn extract_hreflang(document: &Html) -> Vec<Hreflang> {
    select(document, "link[rel][hreflang]")
        .into_iter()
        .filter(|l| has_rel(l, "alternate"))
        .filter_map(|l| {
            let lang = l.value().attr("hreflang")?.trim().to_string();
            let href = l.value().attr("href").unwrap_or("").trim().to_string();
            Some(Hreflang { lang, href })
        })
        .collect()
}

/// Extracts anchors, split into (internal, external)
fn extract_links(document: &Html, base_url: &Url, site: &str) -> (Vec<Link>, Vec<Link>) {
    let mut internal = Vec::new();
    let mut external = Vec::new();

    for element in select(document, "a[href]") {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(url) = resolve_link(href, base_url) else {
            continue;
        };

        let text: String = element_text(&element).chars().take(MAX_LINK_TEXT_CHARS).collect();
        let same_site = is_same_site(&url, site);
        let link = Link {
            url: url.to_string(),
            text,
        };

        if same_site {
            internal.push(link);
        } else {
            external.push(link);
        }
    }

    (internal, external)
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }
    absolute_url.set_fragment(None);
    Some(absolute_url)
}

/// Extracts images; `src` falls back to `data-src`
fn extract_images(document: &Html, base_url: &Url) -> Vec<Image> {
    select(document, "img")
        .into_iter()
        .filter_map(|img| {
            let attrs = img.value();
            let raw = attrs
                .attr("src")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .or_else(|| attrs.attr("data-src").map(str::trim).filter(|s| !s.is_empty()))?;

            let src = base_url
                .join(raw)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| raw.to_string());

            Some(Image {
                src,
                alt: attrs.attr("alt").unwrap_or("").trim().to_string(),
            })
        })
        .collect()
}

/// Collects `@type` values from JSON-LD blocks; malformed blocks are skipped
fn extract_structured_data_types(document: &Html) -> Vec<String> {
    let mut types = Vec::new();

    for script in select(document, "script[type]") {
        let is_json_ld = script
            .value()
            .attr("type")
            .map(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
            .unwrap_or(false);
        if !is_json_ld {
            continue;
        }

        let raw: String = script.text().collect();
        match serde_json::from_str::<Value>(raw.trim()) {
            Ok(value) => collect_types(&value, &mut types),
            Err(e) => tracing::debug!("Ignoring malformed JSON-LD block: {}", e),
        }
    }

    types
}

fn collect_types(value: &Value, types: &mut Vec<String>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_types(item, types);
            }
        }
        Value::Object(map) => {
            match map.get("@type") {
                Some(Value::String(t)) => push_unique(types, t),
                Some(Value::Array(ts)) => {
                    for t in ts.iter().filter_map(Value::as_str) {
                        push_unique(types, t);
                    }
                }
                _ => {}
            }
            if let Some(graph) = map.get("@graph") {
                collect_types(graph, types);
            }
        }
        _ => {}
    }
}

fn push_unique(types: &mut Vec<String>, value: &str) {
    if !types.iter().any(|t| t == value) {
        types.push(value.to_string());
    }
}
