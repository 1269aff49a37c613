//! Crawl summary statistics

use crate::crawler::PageRecord;
use serde::{Deserialize, Serialize};

/// Counts and averages describing what the crawl saw
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub total_pages: usize,
    pub html_pages: usize,
    pub status_2xx: usize,
    pub status_3xx: usize,
    pub status_4xx: usize,
    pub status_5xx: usize,
    /// Rounded mean over HTML pages that have any words
    pub avg_word_count: u64,
    pub total_internal_links: usize,
    pub total_external_links: usize,
    pub total_images: usize,
    pub max_depth_reached: usize,
    pub elapsed_seconds: f64,
    pub pages_per_second: f64,
    /// True if the audit deadline cut any stage short
    pub deadline_hit: bool,
}

impl CrawlSummary {
    /// Builds the summary from the crawled pages
    pub fn from_pages(
        pages: &[PageRecord],
        max_depth_reached: usize,
        elapsed_seconds: f64,
        deadline_hit: bool,
    ) -> Self {
        let count_status = |range: std::ops::Range<u16>| {
            pages.iter().filter(|p| range.contains(&p.status_code)).count()
        };

        let word_counts: Vec<usize> = pages
            .iter()
            .filter(|p| p.is_html && p.word_count > 0)
            .map(|p| p.word_count)
            .collect();
        let avg_word_count = if word_counts.is_empty() {
            0
        } else {
            (word_counts.iter().sum::<usize>() as f64 / word_counts.len() as f64).round() as u64
        };

        let pages_per_second = if elapsed_seconds > 0.0 {
            (pages.len() as f64 / elapsed_seconds * 100.0).round() / 100.0
        } else {
            0.0
        };

        Self {
            total_pages: pages.len(),
            html_pages: pages.iter().filter(|p| p.is_html).count(),
            status_2xx: count_status(200..300),
            status_3xx: count_status(300..400),
            status_4xx: count_status(400..500),
            status_5xx: count_status(500..u16::MAX),
            avg_word_count,
            total_internal_links: pages.iter().map(|p| p.internal_links.len()).sum(),
            total_external_links: pages.iter().map(|p| p.external_links.len()).sum(),
            total_images: pages.iter().map(|p| p.images.len()).sum(),
            max_depth_reached,
            elapsed_seconds,
            pages_per_second,
            deadline_hit,
        }
    }
}
