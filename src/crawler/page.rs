//! Per-page crawl records

use serde::{Deserialize, Serialize};

/// An anchor discovered on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Absolute URL, fragment removed
    pub url: String,
    /// Anchor text, trimmed to at most 120 characters
    pub text: String,
}

/// An image discovered on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    /// Empty when the alt attribute is missing or blank
    pub alt: String,
}

/// A `<link rel="alternate" hreflang>` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hreflang {
    pub lang: String,
    pub href: String,
}

/// Everything the audit knows about one fetched URL
///
/// Exactly one record exists per normalized URL. A record with
/// `status_code == 0` means the request itself failed and `error` says why.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub final_url: String,
    pub status_code: u16,
    pub content_type: String,
    pub is_html: bool,
    pub depth: usize,
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
    /// Seconds from request start to body received
    pub load_time: f64,
    pub error: Option<String>,
}

impl PageRecord {
    /// Record for a request that never produced a response
    pub fn failed(url: &str, depth: usize, error: String, load_time: f64) -> Self {
        Self {
            url: url.to_string(),
            final_url: url.to_string(),
            depth,
            load_time,
            error: Some(error),
            ..Self::default()
        }
    }

    /// True for HTML pages that answered 200
    pub fn is_indexable_html(&self) -> bool {
        self.is_html && self.status_code == 200
    }

    /// True when the robots meta tag carries `noindex`
    pub fn is_noindex(&self) -> bool {
        self.robots_meta
            .as_deref()
            .map(|m| m.to_lowercase().contains("noindex"))
            .unwrap_or(false)
    }

    /// Number of images without alt text
    pub fn images_missing_alt(&self) -> usize {
        self.images.iter().filter(|i| i.alt.trim().is_empty()).count()
    }
}
