//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching of single pages
//! - HTML parsing and SEO signal extraction
//! - The crawl phase state machine
//! - Level-synchronized frontier expansion

mod coordinator;
mod fetcher;
mod page;
mod parser;
mod state;

pub use coordinator::{run_crawl, Coordinator, CrawlOutput};
pub use fetcher::fetch_page;
pub use page::{Hreflang, Image, Link, PageRecord};
pub use parser::{parse_html, ParsedPage, MAX_LINK_TEXT_CHARS};
pub use state::CrawlPhase;
