//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and derives the immutable [`CrawlTarget`] of one audit.
//!
//! # Example
//!
//! ```no_run
//! use seo_audit::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("audit.toml")).unwrap();
//! println!("Auditor will fetch at most {} pages", config.crawler.max_pages);
//! ```

mod parser;
mod target;
mod types;
mod validation;

// Re-export types
pub use target::CrawlTarget;
pub use types::{
    ChecksConfig, Config, CrawlerConfig, OutputConfig, SpeedConfig, UserAgentConfig,
    DEFAULT_SPEED_ENDPOINT,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
