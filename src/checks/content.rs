//! Content quality analysis
//!
//! Works purely on already fetched pages. Duplicate, thin and missing-tag
//! checks only look at HTML pages that answered 200; missing alt text is
//! counted on every page.

use crate::crawler::PageRecord;
use crate::report::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Pages below this many words are thin
pub const THIN_CONTENT_WORDS: usize = 300;

/// Thin pages with at least this many words are only informational
pub const THIN_CONTENT_INFO_WORDS: usize = 100;

/// Kind of content problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentIssueKind {
    DuplicateTitle,
    DuplicateDescription,
    ThinContent,
    MissingTitle,
    MissingDescription,
    MissingH1,
    MultipleH1,
    ImagesMissingAlt,
}

impl ContentIssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DuplicateTitle => "duplicate_title",
            Self::DuplicateDescription => "duplicate_description",
            Self::ThinContent => "thin_content",
            Self::MissingTitle => "missing_title",
            Self::MissingDescription => "missing_description",
            Self::MissingH1 => "missing_h1",
            Self::MultipleH1 => "multiple_h1",
            Self::ImagesMissingAlt => "images_missing_alt",
        }
    }
}

/// One content problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentIssue {
    #[serde(rename = "type")]
    pub kind: ContentIssueKind,
    pub severity: Severity,
    /// Affected pages; more than one only for duplicates
    pub urls: Vec<String>,
    /// The duplicated title or description
    pub value: Option<String>,
    /// Word count, H1 count or images without alt, depending on the kind
    pub count: Option<usize>,
}

impl ContentIssue {
    fn single(kind: ContentIssueKind, severity: Severity, url: &str, count: Option<usize>) -> Self {
        Self {
            kind,
            severity,
            urls: vec![url.to_string()],
            value: None,
            count,
        }
    }

    /// First affected URL
    pub fn url(&self) -> &str {
        self.urls.first().map(String::as_str).unwrap_or("")
    }
}

/// Finds duplicate, thin and missing-tag problems across pages
pub fn analyze_content(pages: &[PageRecord]) -> Vec<ContentIssue> {
    let ok_pages: Vec<&PageRecord> = pages.iter().filter(|p| p.is_indexable_html()).collect();
    let mut issues = Vec::new();

    issues.extend(find_duplicates(
        &ok_pages,
        ContentIssueKind::DuplicateTitle,
        |p| p.title.as_deref(),
    ));
    issues.extend(find_duplicates(
        &ok_pages,
        ContentIssueKind::DuplicateDescription,
        |p| p.meta_description.as_deref(),
    ));

    for page in &ok_pages {
        if page.word_count < THIN_CONTENT_WORDS {
            let severity = if page.word_count >= THIN_CONTENT_INFO_WORDS {
                Severity::Info
            } else {
                Severity::Warning
            };
            issues.push(ContentIssue::single(
                ContentIssueKind::ThinContent,
                severity,
                &page.url,
                Some(page.word_count),
            ));
        }

        if page.title.is_none() {
            issues.push(ContentIssue::single(
                ContentIssueKind::MissingTitle,
                Severity::Error,
                &page.url,
                None,
            ));
        }

        if page.meta_description.is_none() {
            issues.push(ContentIssue::single(
                ContentIssueKind::MissingDescription,
                Severity::Warning,
                &page.url,
                None,
            ));
        }

        match page.h1.len() {
            0 => issues.push(ContentIssue::single(
                ContentIssueKind::MissingH1,
                Severity::Warning,
                &page.url,
                None,
            )),
            1 => {}
            n => issues.push(ContentIssue::single(
                ContentIssueKind::MultipleH1,
                Severity::Info,
                &page.url,
                Some(n),
            )),
        }
    }

    for page in pages {
        let missing = page.images_missing_alt();
        if missing > 0 {
            issues.push(ContentIssue::single(
                ContentIssueKind::ImagesMissingAlt,
                Severity::Warning,
                &page.url,
                Some(missing),
            ));
        }
    }

    tracing::info!("Content analysis found {} issue(s)", issues.len());
    issues
}

/// Groups pages by the lowercased value of a field, in first-seen order
fn find_duplicates<F>(pages: &[&PageRecord], kind: ContentIssueKind, field: F) -> Vec<ContentIssue>
where
    F: Fn(&PageRecord) -> Option<&str>,
{
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for page in pages {
        let Some(value) = field(*page) else {
            continue;
        };
        let key = value.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        match index.get(&key) {
            Some(&i) => groups[i].1.push(page.url.clone()),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![page.url.clone()]));
            }
        }
    }

    groups
        .into_iter()
        .filter(|(_, urls)| urls.len() > 1)
        .map(|(value, urls)| ContentIssue {
            kind,
            severity: Severity::Warning,
            count: Some(urls.len()),
            urls,
            value: Some(value),
        })
        .collect()
}

/// Issues of one kind
pub fn issues_of(issues: &[ContentIssue], kind: ContentIssueKind) -> impl Iterator<Item = &ContentIssue> {
    issues.iter().filter(move |i| i.kind == kind)
}
